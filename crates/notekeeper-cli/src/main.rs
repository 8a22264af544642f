//! Notekeeper - a command-line client for the notekeeper notes service.
//!
//! Restores the session on startup, then reads commands from stdin until
//! `quit` or end of input.

mod app;
mod shell;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use notekeeper_core::config::API_URL_ENV;
use notekeeper_core::{Config, CredentialBackend};

use app::App;
use shell::Flow;

/// Log file name inside the cache directory
const LOG_FILE: &str = "notekeeper.log";

#[derive(Debug, Parser)]
#[command(name = "notekeeper", version, about = "Personal notes from the terminal")]
struct Args {
    /// Backend base URL
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// Seconds to wait for the startup session check
    #[arg(long)]
    bootstrap_timeout: Option<u64>,

    /// Keep the credential in the OS keychain instead of the cache directory
    #[arg(long)]
    keyring: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug). Output
/// goes to stderr and, when `log_dir` is available, to a log file there.
fn init_tracing(log_dir: Option<PathBuf>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    if let Some(secs) = args.bootstrap_timeout {
        config.bootstrap_timeout_secs = secs;
    }
    if args.keyring {
        config.credential_backend = CredentialBackend::Keyring;
    }

    let log_dir = config
        .cache_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let _log_guard = init_tracing(log_dir);
    info!(api = %config.api_base_url, "Notekeeper starting");

    let mut app = App::new(config)?;
    println!("Checking session...");
    let outcome = app.start().await;
    shell::print_bootstrap(&app, outcome);
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        shell::print_prompt(&app);
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        match shell::run_line(&mut app, &line).await {
            Flow::Continue => {}
            Flow::Quit => break,
        }
        shell::print_redirects(&app);
    }

    info!("Notekeeper shutting down");
    Ok(())
}
