//! Tracing subscriber setup.
//!
//! The interactive UI owns the terminal, so it logs to a file in the app data
//! directory that is truncated on every start. One-shot commands log to stderr.
//! `FINDREF_LOG` takes precedence over `RUST_LOG`; the default is `info` for
//! the log file and `warn` for stderr.

use anyhow::{Context, Result};
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use super::app_data::get_log_path;

/// Where log events go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Truncated log file under the app data dir
    File,
    /// Compact lines on stderr
    Stderr,
}

/// Install the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init_logging(target: LogTarget, verbose: bool) -> Result<()> {
    match target {
        LogTarget::File => {
            let path = get_log_path()?;
            let file = File::create(&path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;

            let layer = fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true);

            let _ = tracing_subscriber::registry()
                .with(build_env_filter(if verbose { "debug" } else { "info" }))
                .with(layer)
                .try_init();
        }
        LogTarget::Stderr => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .compact();

            let _ = tracing_subscriber::registry()
                .with(build_env_filter(if verbose { "debug" } else { "warn" }))
                .with(layer)
                .try_init();
        }
    }

    Ok(())
}

/// `FINDREF_LOG` > `RUST_LOG` > the given default level
fn build_env_filter(default_level: &str) -> EnvFilter {
    if let Ok(directives) = std::env::var("FINDREF_LOG")
        && let Ok(filter) = EnvFilter::try_new(&directives)
    {
        return filter;
    }

    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    EnvFilter::new(format!("findref={default_level},warn"))
}
