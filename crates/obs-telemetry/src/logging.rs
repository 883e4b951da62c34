use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to install global tracing subscriber: {0}")]
    SubscriberInstall(String),
}

/// Installs a process-global `tracing` subscriber filtered by `filter`
/// (a `RUST_LOG`-style directive string, e.g. `"info"` or
/// `"indexer_pipeline=debug,warn"`). Call once, at process start.
pub fn init_tracing(filter: &str) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::SubscriberInstall(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| TelemetryError::SubscriberInstall(e.to_string()))
}
