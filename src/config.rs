//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.artfinder.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default config file name, looked up in the current directory.
pub const CONFIG_FILE: &str = ".artfinder.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis service settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Dashboard metric settings.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Chat settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "artfinder_report.md".to_string()
}

/// Analysis service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the analysis service.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    600 // analysis scrapes several sources before answering
}

/// Dashboard metric settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Trailing/leading window length, in samples.
    #[serde(default = "default_window")]
    pub window: usize,

    /// Keyword behind the brand mentions card.
    #[serde(default = "default_brand_keyword")]
    pub brand_keyword: String,

    /// Keyword behind the growth rate card.
    #[serde(default = "default_trend_keyword")]
    pub trend_keyword: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            brand_keyword: default_brand_keyword(),
            trend_keyword: default_trend_keyword(),
        }
    }
}

fn default_window() -> usize {
    30
}

fn default_brand_keyword() -> String {
    "brand".to_string()
}

fn default_trend_keyword() -> String {
    "trend".to_string()
}

/// Chat settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_user_avatar")]
    pub user_avatar: String,

    #[serde(default = "default_assistant_avatar")]
    pub assistant_avatar: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            user_avatar: default_user_avatar(),
            assistant_avatar: default_assistant_avatar(),
        }
    }
}

pub fn default_user_avatar() -> String {
    "/user.png".to_string()
}

pub fn default_assistant_avatar() -> String {
    "/logo.png".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.artfinder.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref base_url) = args.base_url {
            self.server.base_url = base_url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.server.timeout_seconds = timeout;
        }

        if let Some(window) = args.window {
            self.dashboard.window = window;
        }

        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
