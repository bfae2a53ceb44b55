//! Logging initialization.

use thiserror::Error;
use tracing::{info, Level, Subscriber};
use tracing_appender::rolling::{InitError, RollingFileAppender};
use tracing_subscriber::{
    fmt::layer,
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter, Layer,
};

use super::types::{FileLoggingConfig, LoggerConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log directory: {0}")]
    FileAppender(#[from] InitError),

    #[error("failed to install global subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Defaults to INFO, overridable through `RUST_LOG`.
pub(crate) fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy()
}

/// Builds the subscriber described by `config` without installing it.
pub(crate) fn build_subscriber(
    config: &LoggerConfig,
) -> Result<impl Subscriber + Send + Sync, LoggingError> {
    let filt = env_filter();

    // Configure stdout logging with JSON or compact format
    let stdout_sub = if config.stdout_config.json_format {
        layer()
            .json()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    } else {
        layer()
            .compact()
            .with_span_events(config.stdout_config.fmt_span.clone())
            .with_filter(filt.clone())
            .boxed()
    };

    let file_layer = config
        .file_logging_config
        .as_ref()
        .map(|file_config| {
            let file_appender = file_appender(file_config)?;

            let layer = if file_config.json_format {
                layer()
                    .json()
                    .with_writer(file_appender)
                    .with_ansi(false) // No color codes in files
                    .with_filter(filt.clone())
                    .boxed()
            } else {
                layer()
                    .compact()
                    .with_writer(file_appender)
                    .with_ansi(false) // No color codes in files
                    .with_filter(filt.clone())
                    .boxed()
            };
            Ok::<_, LoggingError>(layer)
        })
        .transpose()?;

    Ok(tracing_subscriber::registry()
        .with(stdout_sub)
        .with(file_layer))
}

fn file_appender(config: &FileLoggingConfig) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(config.rotation.clone())
        .filename_prefix(&config.file_name_prefix)
        .build(&config.directory)
}

/// Initializes the global logging subscriber with the provided config.
pub fn init(config: LoggerConfig) -> Result<(), LoggingError> {
    build_subscriber(&config)?.try_init()?;

    info!(
        service_name = %config.service_name,
        log_dir = ?config.file_logging_config.as_ref().map(|c| &c.directory),
        json = config.stdout_config.json_format,
        "logging initialized"
    );
    Ok(())
}
