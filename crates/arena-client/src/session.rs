//! HTTP session with a clearable cookie jar
//!
//! The portal keys the login to a session cookie. The jar is the only
//! state that survives between refreshes; it is owned by [`Session`] and
//! emptied when a new login sequence starts.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;

use crate::error::{Error, Result};

/// Cookie store that can be reset without rebuilding the HTTP client.
#[derive(Debug, Default)]
pub struct SessionJar {
    inner: RwLock<Jar>,
}

impl SessionJar {
    /// Drop every stored cookie.
    pub fn clear(&self) {
        let mut jar = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *jar = Jar::default();
    }
}

impl CookieStore for SessionJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .set_cookies(cookie_headers, url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .cookies(url)
    }
}

/// HTTP client plus the cookie jar it writes to.
///
/// Cheap to clone; clones share the same connection pool and cookies.
#[derive(Debug, Clone)]
pub struct Session {
    http: reqwest::Client,
    jar: Arc<SessionJar>,
}

impl Session {
    /// Build a session. `timeout` bounds each request; `None` keeps the
    /// transport's defaults.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let jar = Arc::new(SessionJar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(jar.clone());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| Error::Client(format!("building HTTP client: {e}")))?;
        Ok(Self { http, jar })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn clear_cookies(&self) {
        self.jar.clear();
    }
}
