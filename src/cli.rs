//! Command-line arguments for the terminal dashboard.
//!
//! The subject comes either from `--subject` or from a page location whose
//! `uname` query parameter names it.

use crate::dashboard::subject_from_location;
use clap::Parser;
use std::path::PathBuf;

/// ARTfinder - market analysis dashboard in your terminal
///
/// Requests a market/competitor analysis for a brand or account, renders
/// the dashboard metrics, and lets you ask the assistant about it.
///
/// Examples:
///   artfinder --subject nike
///   artfinder --location "http://localhost:5173/analysis?uname=nike" --format json
///   artfinder --subject nike --chat "Which channel grows fastest?"
///   artfinder --subject nike --interactive
///   artfinder --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Brand, account or topic to analyze
    #[arg(short, long, value_name = "NAME")]
    pub subject: Option<String>,

    /// Page location or query string carrying the subject as `uname`
    ///
    /// Example: --location "?uname=nike"
    #[arg(long, value_name = "URL", conflicts_with = "subject")]
    pub location: Option<String>,

    /// Base URL of the analysis service
    ///
    /// Can also be set via ARTFINDER_URL env var or .artfinder.toml config.
    #[arg(long, value_name = "URL", env = "ARTFINDER_URL")]
    pub base_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .artfinder.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output file path for the dashboard report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Request timeout in seconds
    ///
    /// Analysis scrapes several sources and may take minutes. Default: from
    /// config or 600s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Window length in samples for the headline metrics
    #[arg(long, value_name = "SAMPLES")]
    pub window: Option<usize>,

    /// Ask the assistant a question after the analysis (repeatable)
    #[arg(long, value_name = "MESSAGE")]
    pub chat: Vec<String>,

    /// Open an interactive chat after the analysis
    #[arg(short, long)]
    pub interactive: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .artfinder.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The subject, from `--subject` or the `uname` query parameter.
    pub fn subject(&self) -> Option<String> {
        self.subject
            .clone()
            .or_else(|| self.location.as_deref().and_then(subject_from_location))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.subject().map_or(true, |s| s.trim().is_empty()) {
            return Err("A subject is required: pass --subject or a --location with ?uname=".to_string());
        }

        if let Some(ref base_url) = self.base_url {
            if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
                return Err("Base URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if self.window == Some(0) {
            return Err("Window must be at least 1 sample".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
