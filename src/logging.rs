use std::env;
use std::path::Path;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/decommenter.log";

/// Install the global subscriber: warnings and diagnostics go to stderr so
/// stdout stays reserved for the run summary, and everything passing the
/// filter is mirrored to `LOG_FILE_PATH` unless that variable is empty.
///
/// The returned guard must outlive all logging; dropping it flushes the file.
pub fn init_logger(verbose: bool) -> Option<WorkerGuard> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| default_level.to_string());

    let log_file_path = env::var("LOG_FILE_PATH").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
    let (file_layer, guard) = match file_writer(&log_file_path) {
        Some((writer, guard)) => (
            Some(fmt::layer().with_writer(writer).with_ansi(false)),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .compact(),
        )
        .with(file_layer)
        .with(EnvFilter::new(filter))
        .init();

    match guard {
        Some(_) => debug!("Logging to stderr and {}", log_file_path),
        None => debug!("Logging to stderr only"),
    }

    guard
}

fn file_writer(
    log_file_path: &str,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if log_file_path.trim().is_empty() {
        return None;
    }
    let path = Path::new(log_file_path);
    let file_name = path.file_name()?;
    let directory = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let appender = tracing_appender::rolling::never(directory, file_name);
    Some(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_log_path_disables_file_layer() {
        assert!(file_writer("").is_none());
        assert!(file_writer("   ").is_none());
    }

    #[test]
    fn test_log_path_is_split_into_directory_and_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("run.log");
        let (_writer, guard) = file_writer(&path.to_string_lossy()).unwrap();
        drop(guard);
        assert!(path.exists());
    }
}
