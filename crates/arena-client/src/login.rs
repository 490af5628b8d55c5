//! Login marker inspection
//!
//! Every Arena page carries the patron login portlet. When the patron is
//! signed in the portlet shows their name; when not, it renders the
//! credential sub-form and, after a failed POST, a warning feedback span.

use scraper::Html;
use tracing::debug;

use crate::constants::{ACCOUNT_LOCKED_PREFIX, INVALID_CREDENTIALS_PREFIX};
use crate::error::{Error, Result};
use crate::selectors;

/// Authentication state read from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    LoggedIn,
    /// The credential form is showing. `reason` is the portal's feedback
    /// text when it gave one that is not a known terminal failure.
    LoggedOut { reason: Option<String> },
}

/// Inspect a page body for the login marker.
///
/// Terminal conditions are errors: a page without the login portlet is
/// `LoginFormNotFound`, and feedback starting with the locked or
/// invalid-credentials prefix is `AccountLocked` / `InvalidCredentials`.
pub fn inspect(html: &str) -> Result<LoginState> {
    let document = Html::parse_document(html);
    let Some(portlet) = document.select(&selectors::LOGIN_PORTLET).next() else {
        return Err(Error::LoginFormNotFound);
    };
    if portlet.select(&selectors::PATRON_FORM).next().is_none() {
        debug!("logged in");
        return Ok(LoginState::LoggedIn);
    }
    let Some(feedback) = portlet.select(&selectors::FEEDBACK_WARNING).next() else {
        debug!("login form shown without feedback");
        return Ok(LoginState::LoggedOut { reason: None });
    };

    let text = feedback.text().collect::<String>();
    let text = text.trim();
    if text.starts_with(ACCOUNT_LOCKED_PREFIX) {
        debug!("account locked");
        return Err(Error::AccountLocked);
    }
    if text.starts_with(INVALID_CREDENTIALS_PREFIX) {
        debug!("invalid credentials");
        return Err(Error::InvalidCredentials);
    }
    debug!(feedback = text, "unrecognized login feedback");
    Ok(LoginState::LoggedOut {
        reason: Some(text.to_string()),
    })
}
