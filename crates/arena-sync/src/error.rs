//! Error types for refresh operations

use arena_client::Error as ClientError;

/// How the orchestrator must react to a failed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    /// Credentials rejected: stop refreshing until they are replaced
    Auth,
    /// Anything else: log and try again next cycle
    Transient,
}

/// Classify a client error for the refresh loop.
pub fn classify(error: &ClientError) -> ErrorClassification {
    if error.is_auth_failure() {
        ErrorClassification::Auth
    } else {
        ErrorClassification::Transient
    }
}

/// Errors from refresh operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("error communicating with the library: {0}")]
    UpdateFailed(String),
}

impl Error {
    pub fn classification(&self) -> ErrorClassification {
        match self {
            Error::AuthFailed(_) => ErrorClassification::Auth,
            Error::UpdateFailed(_) => ErrorClassification::Transient,
        }
    }

    /// The underlying client error's message.
    pub fn reason(&self) -> &str {
        match self {
            Error::AuthFailed(reason) | Error::UpdateFailed(reason) => reason,
        }
    }
}

impl From<ClientError> for Error {
    fn from(error: ClientError) -> Self {
        match classify(&error) {
            ErrorClassification::Auth => Error::AuthFailed(error.to_string()),
            ErrorClassification::Transient => Error::UpdateFailed(error.to_string()),
        }
    }
}

/// Result alias for refresh operations.
pub type Result<T> = std::result::Result<T, Error>;
