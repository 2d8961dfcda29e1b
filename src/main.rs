use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

use storechat::ui::{ChatWidget, Tui};
use storechat::config::ENDPOINT_ENV;
use storechat::{ChatSession, Config, HttpTransport, Submission};

#[derive(Parser)]
#[command(name = "storechat")]
#[command(version = "0.1.0")]
#[command(about = "Storefront support chat widget", long_about = None)]
struct Cli {
    /// Base URL of the chat service (overrides config and STORECHAT_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one message and print the reply
    Ask {
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// Show the resolved configuration
    Config {
        /// Write the resolved configuration back to the config file
        #[arg(long)]
        save: bool,
    },
}

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("storechat=info"))
}

/// The TUI owns the screen, so its logs go to `~/.storechat/storechat.log`
fn init_file_logging() -> Result<()> {
    let path = Config::home_dir()?.join("storechat.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(endpoint: Option<String>) -> Result<Config> {
    let mut config = Config::load()?;
    config.apply_overrides(std::env::var(ENDPOINT_ENV).ok(), endpoint);
    Ok(config)
}

fn new_session(config: &Config) -> Result<ChatSession> {
    let transport = HttpTransport::new(config)?;
    tracing::info!(url = transport.url(), "Chat endpoint configured");
    Ok(ChatSession::new(config, Arc::new(transport)))
}

async fn ask(config: &Config, message: &str) -> Result<()> {
    let session = new_session(config)?;

    match session.submit(message) {
        Submission::Accepted(handle) => handle.await.context("Chat request task failed")?,
        Submission::Ignored(reason) => {
            println!("Nothing to send ({:?}).", reason);
            return Ok(());
        }
    }

    if let Some(turn) = session.last_turn() {
        println!("{}", turn.text);
    }
    Ok(())
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    let path = Config::default_path()?;
    if save {
        config.save()?;
        println!("# saved to {}", path.display());
    } else {
        println!("# {}", path.display());
    }
    print!("{}", toml::to_string_pretty(config).context("Failed to serialize config")?);
    Ok(())
}

/// Runs the blocking terminal loop on the calling thread; requests are
/// spawned onto `runtime`'s workers.
fn run_widget(runtime: &Runtime, config: &Config) -> Result<()> {
    let _guard = runtime.enter();
    let session = new_session(config)?;
    let mut widget = ChatWidget::new(session, &config.ui);

    let mut tui = Tui::init()?;
    tui.run(&mut widget)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let runtime = Runtime::new().context("Failed to start tokio runtime")?;

    match cli.command {
        None => {
            let config = load_config(cli.endpoint)?;
            init_file_logging()?;
            run_widget(&runtime, &config)
        }
        Some(Commands::Ask { message }) => {
            init_stderr_logging();
            let config = load_config(cli.endpoint)?;
            runtime.block_on(ask(&config, &message.join(" ")))
        }
        Some(Commands::Config { save }) => {
            init_stderr_logging();
            let config = load_config(cli.endpoint)?;
            show_config(&config, save)
        }
    }
}
