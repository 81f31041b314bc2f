//! Remote client error types

use coachline_core::errors::CoachError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response
    #[error("Backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// The backend answered with a body we could not decode
    #[error("Unexpected backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The client is missing something it needs for this call
    #[error("Backend client misconfigured: {0}")]
    Config(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        RemoteError::Api {
            status,
            message: message.into(),
            code: None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Api { status, .. } => Some(*status),
            RemoteError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Backend errors reach the user verbatim; only transport and decoding
/// failures are reworded.
impl From<RemoteError> for CoachError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Api {
                status, message, ..
            } => CoachError::Remote { status, message },
            RemoteError::Http(err) => CoachError::remote(502, format!("Backend unavailable: {}", err)),
            RemoteError::Decode(err) => CoachError::Internal(eyre::Report::new(err)),
            RemoteError::Config(message) => CoachError::Internal(eyre::eyre!(message)),
        }
    }
}
