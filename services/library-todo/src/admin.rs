//! Admin API for credential re-entry
//!
//! Runs on a separate listener (default 127.0.0.1:9090). After the portal
//! rejects a login the coordinator stops refreshing; this is how new
//! credentials get in without a restart.
//!
//! Endpoints:
//! - GET  /admin/account      current account settings and auth state
//! - POST /admin/credentials  validate and install new credentials

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use common::Secret;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use arena_sync::{Coordinator, validate_credentials};

/// The settings currently in use. The password is not kept here; it lives
/// only inside the installed client.
#[derive(Debug, Clone)]
pub struct AccountSettings {
    pub url: String,
    pub username: String,
}

/// Shared with the to-do router, whose list ids follow the current username.
pub type SharedSettings = Arc<Mutex<AccountSettings>>;

#[derive(Clone)]
pub struct AdminState {
    coordinator: Arc<Coordinator>,
    settings: SharedSettings,
    /// Serializes credential updates. Reads of `settings` are not blocked.
    updates: Arc<Mutex<()>>,
    timeout: Duration,
}

impl AdminState {
    pub fn new(coordinator: Arc<Coordinator>, settings: SharedSettings, timeout: Duration) -> Self {
        Self {
            coordinator,
            settings,
            updates: Arc::new(Mutex::new(())),
            timeout,
        }
    }
}

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/account", get(account))
        .route("/admin/credentials", post(update_credentials))
        .with_state(state)
}

async fn account(State(state): State<AdminState>) -> impl IntoResponse {
    let settings = state.settings.lock().await.clone();
    let auth = state.coordinator.auth_state().await;

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "name": state.coordinator.name(),
            "url": settings.url,
            "username": settings.username,
            "auth": auth.label(),
        })
        .to_string(),
    )
}

/// Omitted `url` / `username` keep their current values (reauth);
/// supplying them reconfigures the account.
#[derive(Deserialize)]
struct CredentialsRequest {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    username: Option<String>,
    password: String,
}

/// POST /admin/credentials
///
/// Validates with a fresh session first. Only a successful validation
/// replaces the running client; on failure the form error key is returned
/// and nothing changes.
async fn update_credentials(
    State(state): State<AdminState>,
    axum::Json(body): axum::Json<CredentialsRequest>,
) -> impl IntoResponse {
    let update_guard = state.updates.lock().await;
    let current = state.settings.lock().await.clone();
    let url = body.url.unwrap_or(current.url);
    let username = body.username.unwrap_or(current.username);

    let client = match validate_credentials(
        &url,
        &username,
        Secret::new(body.password),
        Some(state.timeout),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            warn!(url = %url, error = %e, form_error = e.key(), "credential update rejected");
            crate::metrics::record_credential_update(e.key());
            return (
                StatusCode::BAD_REQUEST,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                serde_json::json!({ "error": e.key() }).to_string(),
            );
        }
    };

    state.coordinator.replace_source(Arc::new(client)).await;
    *state.settings.lock().await = AccountSettings {
        url: url.clone(),
        username: username.clone(),
    };
    drop(update_guard);
    crate::metrics::record_credential_update("updated");

    let refresh = match state.coordinator.refresh().await {
        Ok(_) => "success",
        Err(e) => {
            warn!(error = %e, "refresh after credential update failed");
            "failed"
        }
    };
    info!(url = %url, refresh, "credentials updated");

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!({
            "status": "updated",
            "url": url,
            "username": username,
            "refresh": refresh,
        })
        .to_string(),
    )
}
