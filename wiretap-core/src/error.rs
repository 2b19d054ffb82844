use thiserror::Error;

/// Unified error type for Wiretap.
#[derive(Error, Debug)]
pub enum WiretapError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Sink error: {0}")]
    SinkError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
