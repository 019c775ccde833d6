//! Error types for Discord lookups

use transport::TransportError;

/// Errors from Discord REST lookups.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("token rejected by {0}")]
    Unauthorized(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] TransportError),

    #[error("{endpoint} returned {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },
}

impl Error {
    /// HTTP status attached to the failure, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Unauthorized(_) => Some(401),
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Http(_) | Error::InvalidResponse { .. } => None,
        }
    }
}

/// Result alias for Discord lookups.
pub type Result<T> = std::result::Result<T, Error>;
