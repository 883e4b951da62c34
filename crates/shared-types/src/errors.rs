use thiserror::Error;

/// Malformed plugin options. Fatal at init time.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing '=' separator in option value: {0:?}")]
    MissingEquals(String),
    #[error("missing ':' separator in option value: {0:?}")]
    MissingColon(String),
    #[error("at least one backend URL must be configured")]
    NoBackendUrls,
    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },
    #[error("failed to read config file {path}: {source}")]
    FileRead { path: String, source: String },
    #[error("failed to parse config file {path}: {source}")]
    FileParse { path: String, source: String },
    #[error("required upstream dependency missing: {0}")]
    MissingDependency(String),
}
