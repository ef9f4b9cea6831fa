//! Error types for honeycomb-cleaner.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, CleanerError>;

#[derive(Debug, Error)]
pub enum CleanerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("HONEYCOMB_API_KEY environment variable not set and --api-key not provided")]
    MissingApiKey,

    /// The API answered with a non-success status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connection, TLS, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Aborted(String),

    #[error("{failed} of {attempted} deletions failed")]
    DeletionFailed { failed: usize, attempted: usize },
}

impl CleanerError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short machine-readable code used in robot output.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::MissingApiKey => "missing_api_key",
            Self::Api { .. } => "api",
            Self::Http(_) => "http",
            Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Aborted(_) => "aborted",
            Self::DeletionFailed { .. } => "deletion_failed",
        }
    }
}
