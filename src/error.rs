//! Mindful Crew error types

use thiserror::Error;

/// Mindful Crew error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The connectivity monitor has not confirmed the backend
    #[error("Backend not connected")]
    NotConnected,

    /// Backend answered with an `{ "error": ... }` envelope
    #[error("{0}")]
    Backend(String),

    /// Backend answered with a non-success HTTP status
    #[error("HTTP error! status: {0}")]
    Status(u16),

    /// The streamed run body broke mid-read
    #[error("Stream error: {0}")]
    Stream(String),

    /// Health probe answered, but not with a healthy payload
    #[error("Unhealthy backend: {0}")]
    Unhealthy(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// A newer request replaced this one before its reply arrived
    #[error("Superseded by a newer request")]
    Superseded,
}

impl Error {
    /// Domain-soft failures are rendered in place and never touch
    /// connectivity.
    pub fn is_soft(&self) -> bool {
        matches!(self, Self::Backend(_))
    }
}

/// Result type alias for Mindful Crew operations
pub type Result<T> = std::result::Result<T, Error>;
