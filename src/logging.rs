//! Tracing setup for the CLI.
//!
//! Events go to stdout through a compact formatter and, when possible, to a log
//! file as well: `DOCQA_LOG_FILE` names an explicit path, otherwise the file lands
//! at `logs/docqa.log`. File writes go through a non-blocking writer so logging
//! never stalls the pipeline.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the stdout layer and, when a writable target exists, the file layer.
///
/// `RUST_LOG` controls filtering and defaults to `info`. The worker guard is held
/// in a process-lifetime static so buffered file output is not lost on exit.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match configure_file_writer() {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Returns `None` when neither the explicit log file nor the default logs
/// directory can be opened; the CLI then runs with stdout logging only.
fn configure_file_writer() -> Option<NonBlocking> {
    if let Ok(path) = std::env::var("DOCQA_LOG_FILE") {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| eprintln!("Failed to open log file {path}: {err}"))
            .ok()?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let _ = LOG_GUARD.set(guard);
        return Some(non_blocking);
    }

    if let Err(err) = std::fs::create_dir_all("logs") {
        eprintln!("Failed to create logs directory: {err}");
        return None;
    }
    let file_appender = tracing_appender::rolling::never("logs", "docqa.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
