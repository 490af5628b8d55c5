//! Credential validation for setup, reauth and reconfigure
//!
//! A single fetch against the portal decides whether submitted settings
//! are usable. Failures map to the four form errors a user can act on;
//! the caller keeps its existing configuration unless validation passes.

use std::time::Duration;

use arena_client::{AccountOverview, ArenaClient, Error as ClientError, Session};
use common::Secret;
use tracing::{info, warn};

use crate::source::OverviewSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("cannot connect to the library")]
    CannotConnect,

    #[error("account is locked")]
    AccountLocked,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("unexpected error")]
    Unknown,
}

impl SetupError {
    /// Form error key shown next to the submitted settings.
    pub fn key(&self) -> &'static str {
        match self {
            SetupError::CannotConnect => "cannot_connect",
            SetupError::AccountLocked => "account_locked",
            SetupError::InvalidCredentials => "invalid_credentials",
            SetupError::Unknown => "unknown",
        }
    }
}

impl From<&ClientError> for SetupError {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::AccountLocked => SetupError::AccountLocked,
            ClientError::InvalidCredentials => SetupError::InvalidCredentials,
            ClientError::Client(_) => SetupError::Unknown,
            ClientError::Http(_)
            | ClientError::Status { .. }
            | ClientError::LoginFormNotFound
            | ClientError::Login(_) => SetupError::CannotConnect,
        }
    }
}

/// Fetch once from `source` and report whether it works.
pub async fn validate(source: &dyn OverviewSource) -> Result<AccountOverview, SetupError> {
    match source.fetch().await {
        Ok(overview) => {
            info!(source = source.id(), "credentials validated");
            Ok(overview)
        }
        Err(e) => {
            let setup_error = SetupError::from(&e);
            warn!(source = source.id(), error = %e, form_error = setup_error.key(), "validation failed");
            Err(setup_error)
        }
    }
}

/// Build a client with a fresh session for the submitted settings and
/// validate it. On success the client is ready to be installed.
pub async fn validate_credentials(
    base_url: &str,
    username: &str,
    password: Secret<String>,
    timeout: Option<Duration>,
) -> Result<ArenaClient, SetupError> {
    let session = Session::new(timeout).map_err(|e| {
        warn!(error = %e, "could not build HTTP session");
        SetupError::Unknown
    })?;
    let client = ArenaClient::new(session, base_url, username, password);
    validate(&client).await?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeSource, overview_with_loans};

    #[test]
    fn client_errors_map_to_form_keys() {
        let cases = [
            (ClientError::AccountLocked, "account_locked"),
            (ClientError::InvalidCredentials, "invalid_credentials"),
            (ClientError::Http("dns".into()), "cannot_connect"),
            (
                ClientError::Status {
                    status: 404,
                    url: "https://lib.example".into(),
                },
                "cannot_connect",
            ),
            (ClientError::LoginFormNotFound, "cannot_connect"),
            (ClientError::Login("unknown".into()), "cannot_connect"),
            (ClientError::Client("tls".into()), "unknown"),
        ];
        for (error, key) in cases {
            assert_eq!(SetupError::from(&error).key(), key, "{error:?}");
        }
    }

    #[tokio::test]
    async fn successful_fetch_validates() {
        let source = FakeSource::new(vec![Ok(overview_with_loans(1))]);
        let overview = validate(source.as_ref()).await.unwrap();
        assert_eq!(overview.loans.len(), 1);
    }

    #[tokio::test]
    async fn rejected_credentials_surface_form_error() {
        let source = FakeSource::new(vec![Err(ClientError::InvalidCredentials)]);
        assert_eq!(
            validate(source.as_ref()).await.unwrap_err(),
            SetupError::InvalidCredentials
        );
    }

    #[tokio::test]
    async fn unreachable_library_cannot_connect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = validate_credentials(
            &format!("http://{addr}"),
            "1234567890",
            Secret::new("0000".into()),
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap_err();
        assert_eq!(err, SetupError::CannotConnect);
    }
}
