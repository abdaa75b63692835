//! # Hoermann Bridge
//!
//! Bridge a Hoermann garage door operator to a network-facing controller.
//!
//! # Control Flow
//!
//! 1. **Initialization**
//!    - Load configuration (first argument, default `config/default.toml`)
//!    - Set up logging: stderr, plus a daily rolling file when configured
//!
//! 2. **Main Loop**
//!    - Bus mode: answer scans and status requests as a UAP1, relay the
//!      gateway link
//!    - Direct mode: decode status reports, send commanded actions
//!    - Actions are read from stdin, one per line; state reports are written
//!      to stdout as JSON lines
//!
//! 3. **Graceful Shutdown**
//!    - Ctrl+C stops the loop and logs frame counters
//!
//! # Examples
//!
//! ```bash
//! cargo run --release -- config/default.toml
//! echo open | cargo run --release
//! ```

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use hoermann_bridge::config::{Config, LoggingConfig};
use hoermann_bridge::runtime;

/// Configuration used when no path is given
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix of the rolling log
const LOG_FILE_PREFIX: &str = "hoermann-bridge.log";

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    let _guard = init_logging(&config.logging);

    info!("Hoermann Bridge v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Mode: {:?}, tick {} ms", config.mode, config.timing.tick_ms);
    info!("Press Ctrl+C to exit");

    runtime::run(&config).await?;

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` overrides the configured level. The returned guard flushes the
/// log file and must live until exit.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let stderr = fmt::layer().with_writer(std::io::stderr);

    match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stderr).init();
            None
        }
    }
}
