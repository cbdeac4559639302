//! Parley TUI entry point.

use clap::Parser;
use parley_tui::runtime::Runtime;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Parley terminal chat client
#[derive(Parser, Debug)]
#[command(name = "parley-tui")]
#[command(about = "Terminal UI for the Parley chat service")]
#[command(version)]
struct Args {
    /// Server URL to prefill in the connect form (enables network mode)
    ///
    /// If not provided, runs in simulation mode with an in-process server.
    #[arg(short, long)]
    server: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    ///
    /// Logs go to `parley-tui.log` so the terminal stays clean.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("parley-tui.log")?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::sync::Arc::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    let runtime = match args.server {
        Some(url) => Runtime::with_server(url)?,
        None => Runtime::new()?,
    };

    Ok(runtime.run().await?)
}
