//! Shared logging bootstrap for quakefeed.
//!
//! Installs a stderr layer governed by `RUST_LOG` (falling back to a
//! crate-scoped default) and, when configured, an append-to-file layer so a
//! long-running watcher leaves an on-disk trail.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "quakefeed=info,quakefeed_watch=info,quakefeed_sinks=info";
const VERBOSE_LOG_FILTER: &str = "quakefeed=debug,quakefeed_watch=debug,quakefeed_sinks=debug";

/// Logging configuration.
pub struct LogConfig<'a> {
    /// Lower the default filter to debug.
    pub verbose: bool,
    /// Also append formatted events to this file.
    pub log_file: Option<&'a Path>,
}

/// Initialize tracing. Call once, before anything logs.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let default_filter = if config.verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter());

    let file_layer = match config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_filter(filter()),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .init();

    Ok(())
}
