use std::path::PathBuf;

use thiserror::Error;

/// Setup and usage errors. These are hard failures: they indicate a
/// misconfigured session rather than a flaky network.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// Settings file does not exist.
    #[error("[galog] settings file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Missing or invalid tracking id, hostname or hit parameter.
    #[error("[galog] {0}")]
    Validation(String),

    /// Dispatch attempted before the session was configured.
    #[error("[galog] {0}")]
    Config(String),

    /// Dispatch attempted without the user's consent.
    #[error("[galog] consent has not been granted; refusing to send")]
    Consent,

    /// Custom collection endpoint rejected.
    #[error("[galog] {0}")]
    InvalidEndpoint(String),

    #[error("[galog] I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[galog] malformed settings in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for galog operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// A failed network call. Returned inside [`crate::Delivery::Failed`],
/// never as an `Err`.
#[derive(Debug, Clone, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
