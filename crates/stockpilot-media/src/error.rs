//! Error types for the media client.

use std::time::Duration;

/// Object-storage errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Credentials or bucket settings are missing.
    #[error("media storage not configured: {message}")]
    Config { message: String },

    /// Account authorization failed or the token was rejected.
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The key is valid but not allowed to do this (or a cap was hit).
    #[error("forbidden: {message}")]
    Forbidden { message: String },

    /// Bucket or file unknown to the storage service.
    #[error("not found: {message}")]
    NotFound { message: String },

    /// The storage service rejected the request as malformed.
    #[error("bad request ({code}): {message}")]
    BadRequest { code: String, message: String },

    /// Too many requests, or the service asked us to come back later.
    #[error("rate limited: retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Transport failure or 5xx.
    #[error("network error: {message}")]
    Network { message: String },

    /// A 2xx response we could not understand.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// The payload handed to the client is unusable.
    #[error("invalid media: {message}")]
    InvalidMedia { message: String },
}

impl MediaError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 1,
            Self::InvalidMedia { .. } => 2,
            Self::BadRequest { .. } => 2,

            Self::Unauthorized { .. } => 3,
            Self::Forbidden { .. } => 3,
            Self::NotFound { .. } => 3,

            Self::RateLimited { .. } => 5,
            Self::Network { .. } => 5,

            Self::InvalidResponse { .. } => 6,
        }
    }

    /// Whether the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Network { .. })
    }
}

impl From<reqwest::Error> for MediaError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
