use anyhow::Result;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

/// Daily rolling appender under the configured directory, if any
fn file_appender(config: &LoggingConfig) -> Result<Option<RollingFileAppender>> {
    let Some(directory) = &config.directory else {
        return Ok(None);
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("property-match")
        .filename_suffix("log")
        .build(directory)?;
    Ok(Some(appender))
}

/// Install the global subscriber. `RUST_LOG` wins over `config.level`.
/// Console output goes to stderr; stdout carries replies.
pub fn init_logger(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)?,
    };

    let appender = file_appender(config)?;

    match config.format.as_str() {
        "json" => {
            let file_layer = appender.map(|writer| {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(true),
                )
                .with(file_layer)
                .try_init()?;
        }
        _ => {
            let file_layer = appender.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(false) // No colors in file
            });

            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_level(true)
                        .with_thread_ids(false),
                )
                .with(file_layer)
                .try_init()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_no_directory_means_no_file_appender() {
        let config = LoggingConfig::default();
        assert!(file_appender(&config).unwrap().is_none());
    }

    #[test]
    fn test_directory_builds_file_appender() {
        let dir = tempdir().unwrap();
        let config = LoggingConfig {
            directory: Some(dir.path().to_path_buf()),
            ..LoggingConfig::default()
        };
        assert!(file_appender(&config).unwrap().is_some());
    }
}
