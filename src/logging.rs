use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// for the whole run. Fails if `log_dir` cannot be created or written.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    // Create a non-blocking file appender for daily log rotation
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("process_data.log")
        .build(log_dir)?;
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Create a JSON layer for file logging
    let file_layer = fmt::layer().json().with_writer(non_blocking_writer);

    // Console goes to stderr; stdout carries the progress lines
    let console_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);

    // Respect RUST_LOG if set; otherwise default to info for our crate
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("disaster_etl=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EtlError;
    use tempfile::NamedTempFile;

    #[test]
    fn test_log_dir_that_is_a_file_fails() {
        let file = NamedTempFile::new().unwrap();

        let err = init_logging(file.path()).unwrap_err();
        assert!(matches!(err, EtlError::Io(_)));
    }

    #[test]
    fn test_log_dir_below_a_file_fails() {
        let file = NamedTempFile::new().unwrap();

        let err = init_logging(&file.path().join("logs")).unwrap_err();
        assert!(matches!(err, EtlError::Io(_)));
    }
}
