//! Authenticated Arena client
//!
//! Fetches the account overview and logs in on demand:
//! 1. GET the overview page and inspect it for the login marker
//! 2. Logged in: return the body
//! 3. Logged out: clear cookies, POST the login form (up to
//!    `LOGIN_ATTEMPTS` times) and inspect each response the same way
//! 4. A locked account or bad credentials stops immediately; exhausting
//!    the attempts is a generic login error
//!
//! Non-2xx responses abort with `Error::Status` and are never retried here.

use common::Secret;
use tracing::{debug, instrument};

use crate::constants::{
    FORM_FIELD_HIDDEN, FORM_FIELD_PASSWORD, FORM_FIELD_USERNAME, LOGIN_ATTEMPTS, LOGIN_QUERY,
    OVERVIEW_PATH,
};
use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::login::{LoginState, inspect};
use crate::models::AccountOverview;
use crate::session::Session;

/// Client for one patron account at one library.
#[derive(Debug, Clone)]
pub struct ArenaClient {
    session: Session,
    base_url: String,
    username: String,
    password: Secret<String>,
}

impl ArenaClient {
    pub fn new(
        session: Session,
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: Secret<String>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            session,
            base_url,
            username: username.into(),
            password,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn overview_url(&self) -> String {
        format!("{}{}", self.base_url, OVERVIEW_PATH)
    }

    /// Raw overview HTML, logging in first if the session has lapsed.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_account_overview(&self) -> Result<String> {
        let url = self.overview_url();
        let response = self
            .session
            .http()
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(format!("overview request failed: {e}")))?;
        let body = read_body(response, &url).await?;

        match inspect(&body)? {
            LoginState::LoggedIn => Ok(body),
            LoginState::LoggedOut { .. } => self.login_and_fetch(&url).await,
        }
    }

    /// Fetch the overview page and extract its records.
    pub async fn account_overview(&self) -> Result<AccountOverview> {
        let html = self.fetch_account_overview().await?;
        Ok(Extractor::from_html(&html).overview())
    }

    /// POST the login form against `url`; the response to a successful
    /// login is the page itself.
    async fn login_and_fetch(&self, url: &str) -> Result<String> {
        let form = [
            (FORM_FIELD_HIDDEN, ""),
            (FORM_FIELD_USERNAME, self.username.as_str()),
            (FORM_FIELD_PASSWORD, self.password.expose().as_str()),
        ];
        self.session.clear_cookies();

        let mut last_reason = None;
        for attempt in 1..=LOGIN_ATTEMPTS {
            debug!(attempt, "attempting to log in");
            let response = self
                .session
                .http()
                .post(url)
                .query(&LOGIN_QUERY[..])
                .form(&form)
                .send()
                .await
                .map_err(|e| Error::Http(format!("login request failed: {e}")))?;
            let body = read_body(response, url).await?;

            match inspect(&body)? {
                LoginState::LoggedIn => {
                    debug!(attempt, "login succeeded");
                    return Ok(body);
                }
                LoginState::LoggedOut { reason } => {
                    debug!(attempt, reason = ?reason, "still logged out");
                    last_reason = reason;
                }
            }
        }

        Err(Error::Login(last_reason.unwrap_or_else(|| {
            format!("unknown login error after {LOGIN_ATTEMPTS} attempts")
        })))
    }
}

async fn read_body(response: reqwest::Response, url: &str) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    response
        .text()
        .await
        .map_err(|e| Error::Http(format!("reading response body: {e}")))
}
