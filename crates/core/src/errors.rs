use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// An error reported by the external backend, carried verbatim.
    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("Internal server error: {0}")]
    Internal(#[from] eyre::Report),
}

impl CoachError {
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        CoachError::Remote {
            status,
            message: message.into(),
        }
    }
}

pub type CoachResult<T> = Result<T, CoachError>;
