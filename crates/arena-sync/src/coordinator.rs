//! Refresh coordinator
//!
//! Owns the overview source, runs one refresh at a time, and publishes each
//! successful result on a watch channel. A rejected login latches the
//! coordinator into `AuthState::Failed`: further refreshes return
//! immediately without contacting the portal. The latch is cleared by
//! installing new credentials with `replace_source`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use arena_client::AccountOverview;
use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use crate::error::{Error, ErrorClassification, Result};
use crate::source::OverviewSource;

/// Whether the stored credentials are still trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Valid,
    Failed { reason: String },
}

impl AuthState {
    pub fn label(&self) -> &'static str {
        match self {
            AuthState::Valid => "valid",
            AuthState::Failed { .. } => "failed",
        }
    }
}

/// Outcome of the most recent refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Success,
    AuthFailed,
    UpdateFailed,
    /// Skipped because credentials are known bad
    Suppressed,
}

impl RefreshOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshOutcome::Success => "success",
            RefreshOutcome::AuthFailed => "auth_failed",
            RefreshOutcome::UpdateFailed => "update_failed",
            RefreshOutcome::Suppressed => "suppressed",
        }
    }
}

/// Published data: `None` until the first successful refresh.
pub type Published = Option<Arc<AccountOverview>>;

#[derive(Debug, Clone, Copy)]
struct LastRefresh {
    outcome: RefreshOutcome,
    at_secs: u64,
}

pub struct Coordinator {
    name: String,
    source: RwLock<Arc<dyn OverviewSource>>,
    auth: RwLock<AuthState>,
    last: RwLock<Option<LastRefresh>>,
    data: watch::Sender<Published>,
    /// Held for the whole of a refresh so timer and on-demand refreshes
    /// never overlap.
    in_flight: Mutex<()>,
}

impl Coordinator {
    /// `name` is the account's display name, used in logs and health.
    pub fn new(name: impl Into<String>, source: Arc<dyn OverviewSource>) -> Self {
        let name = name.into();
        let (data, _) = watch::channel(None);
        info!(name, source = source.id(), "coordinator initialized");
        Self {
            name,
            source: RwLock::new(source),
            auth: RwLock::new(AuthState::Valid),
            last: RwLock::new(None),
            data,
            in_flight: Mutex::new(()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receiver that sees every published overview.
    pub fn subscribe(&self) -> watch::Receiver<Published> {
        self.data.subscribe()
    }

    /// Most recently published overview.
    pub fn current(&self) -> Published {
        self.data.borrow().clone()
    }

    pub async fn auth_state(&self) -> AuthState {
        self.auth.read().await.clone()
    }

    /// Initial refresh during setup. Unlike timer refreshes, a failure here
    /// means the account could not be set up at all.
    pub async fn first_refresh(&self) -> Result<Arc<AccountOverview>> {
        self.refresh().await
    }

    /// Fetch and publish a fresh overview.
    pub async fn refresh(&self) -> Result<Arc<AccountOverview>> {
        let _guard = self.in_flight.lock().await;

        if let AuthState::Failed { reason } = &*self.auth.read().await {
            warn!(
                name = self.name,
                reason, "authentication failed earlier, not refreshing until credentials are updated"
            );
            self.record(RefreshOutcome::Suppressed).await;
            return Err(Error::AuthFailed(reason.clone()));
        }

        let source = self.source.read().await.clone();
        match source.fetch().await {
            Ok(overview) => {
                let (loans, active, ready) = overview.counts();
                info!(name = self.name, loans, active, ready, "refresh succeeded");
                debug!(?overview, "published overview");
                record_counts(&overview);
                let overview = Arc::new(overview);
                self.data.send_replace(Some(overview.clone()));
                self.record(RefreshOutcome::Success).await;
                Ok(overview)
            }
            Err(e) => {
                let error = Error::from(e);
                match error.classification() {
                    ErrorClassification::Auth => {
                        warn!(name = self.name, error = %error, "library rejected credentials, suspending refresh");
                        *self.auth.write().await = AuthState::Failed {
                            reason: error.reason().to_string(),
                        };
                        self.record(RefreshOutcome::AuthFailed).await;
                    }
                    ErrorClassification::Transient => {
                        warn!(name = self.name, error = %error, "refresh failed, will retry next cycle");
                        self.record(RefreshOutcome::UpdateFailed).await;
                    }
                }
                Err(error)
            }
        }
    }

    /// Install a source built from new credentials and clear any auth latch.
    ///
    /// Waits for an in-flight refresh so it never sees a half-swapped state.
    pub async fn replace_source(&self, source: Arc<dyn OverviewSource>) {
        let _guard = self.in_flight.lock().await;
        info!(name = self.name, source = source.id(), "credentials updated");
        *self.source.write().await = source;
        *self.auth.write().await = AuthState::Valid;
    }

    /// Coordinator health for the /health endpoint.
    pub async fn health(&self) -> serde_json::Value {
        let auth = self.auth.read().await.clone();
        let last = *self.last.read().await;
        let (status, reason) = match (&auth, last.map(|l| l.outcome)) {
            (AuthState::Failed { reason }, _) => ("unhealthy", Some(reason.clone())),
            (AuthState::Valid, Some(RefreshOutcome::Success)) => ("healthy", None),
            (AuthState::Valid, Some(_)) => ("degraded", None),
            (AuthState::Valid, None) => ("starting", None),
        };
        let counts = self.current().map(|overview| {
            let (loans, active, ready) = overview.counts();
            serde_json::json!({
                "loans": loans,
                "active_reservations": active,
                "ready_reservations": ready,
            })
        });

        serde_json::json!({
            "status": status,
            "name": self.name,
            "auth": auth.label(),
            "auth_reason": reason,
            "last_refresh": last.map(|l| l.outcome.label()),
            "last_refresh_unix": last.map(|l| l.at_secs),
            "records": counts,
        })
    }

    async fn record(&self, outcome: RefreshOutcome) {
        metrics::counter!("library_refresh_total", "outcome" => outcome.label()).increment(1);
        let at_secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        *self.last.write().await = Some(LastRefresh { outcome, at_secs });
    }
}

fn record_counts(overview: &AccountOverview) {
    let (loans, active, ready) = overview.counts();
    metrics::gauge!("library_records", "list" => "loans").set(loans as f64);
    metrics::gauge!("library_records", "list" => "active_reservations").set(active as f64);
    metrics::gauge!("library_records", "list" => "ready_reservations").set(ready as f64);
}
