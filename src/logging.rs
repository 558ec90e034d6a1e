//! Console and event-log setup.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Error)]
#[error("Cannot open log file {}: {source}", path.display())]
pub struct LogFileError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Builds the subscriber without installing it.
///
/// The console layer honours `RUST_LOG` and otherwise shows `info` (or
/// `debug` when `verbose`). When `log_file` is given, every event from
/// `debug` up is appended to it as plain text, one event per line.
pub fn build_subscriber(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<impl Subscriber + Send + Sync + use<>, LogFileError> {
    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });

    let file_layer = match log_file {
        Some(path) => {
            let open_error = |source| LogFileError {
                path: path.to_path_buf(),
                source,
            };
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).map_err(open_error)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(open_error)?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    Ok(tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_filter(console_filter),
        )
        .with(file_layer))
}

/// Installs the global subscriber.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<(), LogFileError> {
    build_subscriber(verbose, log_file)?.init();
    if let Some(path) = log_file {
        tracing::debug!("Logging events to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_layer_appends_plain_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("logs").join("events.log");

        for round in 0..2 {
            let subscriber = build_subscriber(false, Some(&log_path)).unwrap();
            tracing::subscriber::with_default(subscriber, || {
                tracing::debug!("Moved: a{} -> b{}", round, round);
                tracing::warn!("Failed: c{} - Error: denied", round);
            });
        }

        let content = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("Moved: a0 -> b0"));
        assert!(lines[1].ends_with("Failed: c0 - Error: denied"));
        assert!(lines[2].ends_with("Moved: a1 -> b1"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    fn test_unopenable_log_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let result = build_subscriber(false, Some(&blocker.join("events.log")));
        assert!(result.is_err());
    }
}
