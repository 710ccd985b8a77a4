//! Tracing setup: compact console output plus an append-only log file.
//!
//! `DOCANALYTICS_LOG_FILE` selects the file; without it, records go to `logs/docanalytics.log`.
//! File writes go through a non-blocking worker whose guard lives for the whole process.
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, fmt::writer::BoxMakeWriter, prelude::*};

const LOG_FILE_VAR: &str = "DOCANALYTICS_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/docanalytics.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber with console output on stdout.
///
/// `RUST_LOG` controls filtering and defaults to `info`. When the log file cannot be opened the
/// process keeps logging to the console only.
pub fn init_tracing() {
    install(BoxMakeWriter::new(std::io::stdout));
}

/// Same as [`init_tracing`], but console output goes to stderr so stdout stays free for protocol
/// traffic or command output.
pub fn init_tracing_stderr() {
    install(BoxMakeWriter::new(std::io::stderr));
}

fn install(console: BoxMakeWriter) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(console)
        .with_target(false)
        .compact();
    let file_layer = file_writer(&log_file_path(std::env::var(LOG_FILE_VAR).ok())).map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Resolve the log file location from an optional override.
fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn file_writer(path: &Path) -> Option<NonBlocking> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        if let Err(err) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {err}", parent.display());
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_used_when_unset_or_blank() {
        assert_eq!(log_file_path(None), PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(
            log_file_path(Some("  ".to_string())),
            PathBuf::from(DEFAULT_LOG_FILE)
        );
        assert_eq!(
            log_file_path(Some("/tmp/analytics.log".to_string())),
            PathBuf::from("/tmp/analytics.log")
        );
    }

    #[test]
    fn file_writer_creates_missing_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("service.log");
        assert!(file_writer(&path).is_some());
        assert!(path.exists());
    }
}
