//! Error types for Arena client operations

/// Errors from fetching the account overview.
///
/// Extraction never produces these; every failure originates in the
/// session/login path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("{url} returned {status}")]
    Status { status: u16, url: String },

    #[error("could not find login form")]
    LoginFormNotFound,

    #[error("account is locked")]
    AccountLocked,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("could not log in: {0}")]
    Login(String),
}

impl Error {
    /// Whether the portal rejected the credentials themselves. Callers must
    /// not retry these until the user supplies new credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::AccountLocked | Error::InvalidCredentials)
    }
}

/// Result alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;
