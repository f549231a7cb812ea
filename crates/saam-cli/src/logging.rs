//! File logging setup.
//!
//! Logs go to `${SAAM_HOME}/logs/` rather than the terminal so streamed
//! replies stay readable. The filter comes from `SAAM_LOG` (default `info`).

use anyhow::{Context, Result};
use saam_core::config::paths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initializes tracing. The returned guard must stay alive for the whole
/// process or buffered log lines are dropped.
pub fn init() -> Result<WorkerGuard> {
    let logs_dir = paths::logs_dir();
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("create log dir {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&logs_dir, "saam.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("SAAM_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
