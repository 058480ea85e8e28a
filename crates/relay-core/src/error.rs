use thiserror::Error;

/// Top-level error type for relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Missing or unusable configuration (e.g. no webhook URL).
    #[error("config error: {0}")]
    Config(String),

    /// A webhook delivery failed (transport error or non-success status).
    #[error("delivery error: {0}")]
    Delivery(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
