//! ARTfinder - market analysis dashboard for the terminal
//!
//! Mounts the dashboard controllers against the analysis service, renders
//! the report, and optionally chats with the assistant about it.
//!
//! Exit codes:
//!   0 - Success (or the user chose to leave the analysis)
//!   1 - Runtime error (config, IO, invalid arguments)
//!   2 - The analysis request failed

use anyhow::{Context, Result};
use artfinder::cli::{Args, OutputFormat};
use artfinder::config::Config;
use artfinder::dashboard::Dashboard;
use artfinder::models::{ConversationMessage, Role};
use artfinder::report;
use artfinder::session::{NavigationOutcome, SessionPhase};
use artfinder::terminal::{Input, Terminal};
use artfinder::transport::{HttpTransport, HttpTransportConfig, Transport};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{BufReader, Stdin};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("ARTfinder v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .artfinder.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(artfinder::config::CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .artfinder.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .artfinder.toml")?;

    println!("✅ Created .artfinder.toml with default settings.");
    println!("   Edit it to point at your analysis service and tune the metrics.");
    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` wins when set.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Whether the user is still on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Stay,
    Leave,
}

type Console = Terminal<BufReader<Stdin>>;

/// Run the complete dashboard workflow. Returns the exit code.
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(HttpTransportConfig {
            base_url: config.server.base_url.clone(),
            timeout_seconds: config.server.timeout_seconds,
        })
        .context("Failed to create HTTP client")?,
    );

    let subject = args.subject();
    let mut terminal = Terminal::stdin(args.quiet);
    let mut dashboard = Dashboard::mount(transport.clone(), subject.clone(), &config, &mut terminal);

    // Step 1: the one analyze request for this page
    if !args.quiet {
        println!("🔬 Analyzing: {}", subject.as_deref().unwrap_or(""));
        println!("   Service: {}", config.server.base_url);
        println!("   Timeout: {}s\n", config.server.timeout_seconds);
    }

    if let Some(ticket) = dashboard.session_mut().begin(subject.as_deref()) {
        let message = format!("Analyzing {}...", ticket.subject());
        let outcome = terminal
            .await_guarded(
                transport.analyze(ticket.subject()),
                &message,
                dashboard.session_mut(),
                tokio::signal::ctrl_c,
            )
            .await;

        match outcome {
            Some(result) => dashboard.session_mut().complete(ticket, result),
            None => return Ok(leave(dashboard)),
        }
    }

    match dashboard.session().phase() {
        SessionPhase::Loaded => println!("✅ Analysis loaded in {:.1}s", start_time.elapsed().as_secs_f64()),
        SessionPhase::Failed => {
            if let Some(err) = dashboard.session().state().error() {
                eprintln!("❌ Error loading analysis: {}", err);
                if err.is_network() {
                    eprintln!("   Is the analysis service running at {}?", config.server.base_url);
                }
            }
        }
        phase => warn!("Analysis ended in unexpected {} state", phase),
    }

    // Step 2: scripted questions, then the interactive chat
    for message in &args.chat {
        if ask(&mut dashboard, &transport, &mut terminal, message).await == Flow::Leave {
            return Ok(leave(dashboard));
        }
    }

    if args.interactive && interactive_chat(&mut dashboard, &transport, &mut terminal).await == Flow::Leave {
        return Ok(leave(dashboard));
    }

    // Step 3: render the dashboard
    let snapshot = dashboard.snapshot();
    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&snapshot)?,
        OutputFormat::Markdown => report::generate_markdown_report(&snapshot),
    };

    let output_path = PathBuf::from(&config.general.output);
    report::write_report(&output, &output_path)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if let Some(ref panel) = snapshot.report {
        println!("\n📊 Market Overview:");
        println!(
            "   Sentiment: {} ({})",
            panel.metrics.market_sentiment.value, panel.metrics.market_sentiment.label
        );
        println!("   Search volume: {}", panel.metrics.search_volume);
        println!("   Brand mentions: {}", panel.metrics.brand_mentions);
        println!("   Growth rate: {}%", panel.metrics.growth_rate);
        println!("   Months compared: {}", panel.growth.len());
    }
    println!("\n📝 Dashboard saved to: {}", output_path.display());

    let failed = dashboard.session().phase() == SessionPhase::Failed;
    dashboard.unmount();

    Ok(if failed { 2 } else { 0 })
}

fn leave(dashboard: Dashboard) -> i32 {
    info!("Left the analysis page");
    println!("\n👋 Analysis abandoned.");
    dashboard.unmount();
    0
}

/// Submit one chat message and print the reply.
async fn ask(
    dashboard: &mut Dashboard,
    transport: &Arc<dyn Transport>,
    terminal: &mut Console,
    text: &str,
) -> Flow {
    let Some(pending) = dashboard.chat_mut().begin_submit(text) else {
        debug!("Chat submission ignored");
        return Flow::Stay;
    };

    if !terminal.quiet() {
        println!("\n🧑 User: {}", text);
    }

    let outcome = terminal
        .await_guarded(
            transport.chat(pending.message()),
            "Response generating...",
            dashboard.session_mut(),
            tokio::signal::ctrl_c,
        )
        .await;

    let Some(result) = outcome else {
        return Flow::Leave;
    };

    dashboard.chat_mut().finish(pending, result);
    if let Some(reply) = dashboard.chat().messages().last() {
        print_message(reply, false);
    }

    Flow::Stay
}

fn print_message(message: &ConversationMessage, expanded: bool) {
    println!("\n🤖 {}: {}", message.role, message.text);

    if message.role != Role::Assistant || !message.has_details() {
        return;
    }

    if !expanded {
        println!("   (type /details to show insights and references)");
        return;
    }

    for (key, value) in &message.insights {
        println!("   {}: {}", key.replace('_', " ").to_uppercase(), value);
    }
    for reference in &message.references {
        println!("   - {}", reference);
    }
}

/// Read questions from stdin until EOF or `/quit`.
async fn interactive_chat(
    dashboard: &mut Dashboard,
    transport: &Arc<dyn Transport>,
    terminal: &mut Console,
) -> Flow {
    println!("\n💬 Chat with ARTfinder Ai (/details toggles the last reply, /quit exits)");

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match terminal.read_input(tokio::signal::ctrl_c()).await {
            Input::Line(line) => line,
            Input::Eof => return Flow::Stay,
            Input::Interrupted => {
                if terminal.back_navigation(dashboard.session_mut()).await == NavigationOutcome::Left {
                    return Flow::Leave;
                }
                continue;
            }
        };

        match line.trim() {
            "/quit" | "/exit" => return Flow::Stay,
            "/details" => toggle_last_details(dashboard),
            _ => {
                if ask(dashboard, transport, terminal, &line).await == Flow::Leave {
                    return Flow::Leave;
                }
            }
        }
    }
}

fn toggle_last_details(dashboard: &mut Dashboard) {
    let last = dashboard
        .chat()
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant && m.has_details())
        .and_then(|m| m.id);

    let Some(id) = last else {
        println!("   No reply with details yet.");
        return;
    };

    dashboard.chat_mut().toggle_details(id);

    let chat = dashboard.chat();
    if let Some(message) = chat.messages().iter().find(|m| m.id == Some(id)) {
        print_message(message, chat.details_visible(id));
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .artfinder.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
