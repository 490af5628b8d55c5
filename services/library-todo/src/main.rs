//! Library to-do service
//!
//! Single-binary service that:
//! 1. Logs in to an Axiell Arena library portal
//! 2. Scrapes the patron's loans and holds on a timer
//! 3. Serves them as two to-do lists (`checked_out`, `holds`) over HTTP
//!
//! `library-todo --check` validates the configured credentials and exits.

mod admin;
mod config;
mod metrics;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use common::Secret;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use metrics_exporter_prometheus::PrometheusHandle;

use arena_client::{ArenaClient, Session};
use arena_sync::{Coordinator, TodoList, spawn_refresh_task, validate_credentials};

use crate::admin::{AccountSettings, AdminState, SharedSettings, build_admin_router};
use crate::config::Config;

/// Upper bound on draining open requests after a shutdown signal.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state accessible from all handlers
#[derive(Clone)]
struct AppState {
    coordinator: Arc<Coordinator>,
    /// Current account; its username prefixes the lists' unique ids
    settings: SharedSettings,
    prometheus: PrometheusHandle,
}

fn build_router(state: AppState, max_connections: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/todo/{list}", get(todo_handler))
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_connections))
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("starting library-todo");

    let args: Vec<String> = std::env::args().collect();
    let cli_config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());
    let check_only = args.iter().any(|a| a == "--check");

    let config_path = Config::resolve_path(cli_config_path);
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    let password = config
        .library
        .password
        .clone()
        .context("library password not configured")?;

    info!(
        name = config.library.name,
        url = config.library.url,
        listen_addr = %config.service.listen_addr,
        admin_addr = %config.service.admin_addr,
        refresh_interval_secs = config.service.refresh_interval_secs,
        "configuration loaded"
    );

    if check_only {
        return check_credentials(&config, password).await;
    }

    // Install before the first refresh so its outcome is counted
    let prometheus_handle = metrics::install_recorder();

    let session =
        Session::new(Some(config.service.timeout())).context("failed to build HTTP session")?;
    let client = ArenaClient::new(
        session,
        &config.library.url,
        &config.library.username,
        password,
    );
    let coordinator = Arc::new(Coordinator::new(&config.library.name, Arc::new(client)));

    coordinator
        .first_refresh()
        .await
        .with_context(|| format!("initial refresh from {} failed", config.library.url))?;

    let refresh_task = spawn_refresh_task(coordinator.clone(), config.service.refresh_interval());

    let settings = Arc::new(tokio::sync::Mutex::new(AccountSettings {
        url: config.library.url.clone(),
        username: config.library.username.clone(),
    }));
    let admin_state = AdminState::new(
        coordinator.clone(),
        settings.clone(),
        config.service.timeout(),
    );
    let admin_app = build_admin_router(admin_state);

    let app_state = AppState {
        coordinator,
        settings,
        prometheus: prometheus_handle,
    };
    let app = build_router(app_state, config.service.max_connections);

    let listen_addr = config.service.listen_addr;
    let listener = TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind to {listen_addr}"))?;
    let admin_addr = config.service.admin_addr;
    let admin_listener = TcpListener::bind(admin_addr)
        .await
        .with_context(|| format!("failed to bind admin listener to {admin_addr}"))?;

    info!(addr = %listen_addr, admin_addr = %admin_addr, "accepting requests");

    // Both servers drain on the same signal. The drain timeout starts when
    // the signal fires, not when the servers start.
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(());

    let mut rx = shutdown_rx.clone();
    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = rx.changed().await;
            })
            .await
    });

    let mut rx = shutdown_rx;
    let admin_handle = tokio::spawn(async move {
        axum::serve(admin_listener, admin_app)
            .with_graceful_shutdown(async move {
                let _ = rx.changed().await;
            })
            .await
    });

    shutdown_signal().await;

    refresh_task.abort();
    let _ = shutdown_tx.send(());

    let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
        (server_handle.await, admin_handle.await)
    })
    .await;
    match drained {
        Ok(results) => {
            for (listener, result) in [("todo", results.0), ("admin", results.1)] {
                match result {
                    Ok(Ok(())) => info!(listener, "drained"),
                    Ok(Err(e)) => error!(listener, error = %e, "server error during shutdown"),
                    Err(e) => error!(listener, error = %e, "server task panicked"),
                }
            }
        }
        Err(_) => {
            warn!(
                drain_timeout_secs = DRAIN_TIMEOUT.as_secs(),
                "drain timeout exceeded, forcing shutdown"
            );
        }
    }

    info!("shutdown complete");
    Ok(())
}

/// `--check`: one login and fetch with the configured credentials.
async fn check_credentials(config: &Config, password: Secret<String>) -> Result<()> {
    match validate_credentials(
        &config.library.url,
        &config.library.username,
        password,
        Some(config.service.timeout()),
    )
    .await
    {
        Ok(client) => {
            info!(url = client.base_url(), "credentials ok");
            Ok(())
        }
        Err(e) => anyhow::bail!("credential check failed: {e} ({})", e.key()),
    }
}

/// Coordinator health plus the published lists. 503 once the portal has
/// rejected the credentials.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let mut body = state.coordinator.health().await;
    let overview = state.coordinator.current();
    let account_id = state.settings.lock().await.username.clone();
    body["lists"] = TodoList::ALL
        .iter()
        .map(|list| {
            serde_json::json!({
                "key": list.key(),
                "unique_id": list.unique_id(&account_id),
                "items": overview.as_ref().map(|o| list.items(o).len()),
            })
        })
        .collect();

    let status_code = if body["status"] == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        state.prometheus.render(),
    )
}

/// GET /todo/{list}: the list's items as a JSON array.
async fn todo_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> impl IntoResponse {
    let Some(list) = TodoList::from_key(&key) else {
        return (
            StatusCode::NOT_FOUND,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            serde_json::json!({ "error": format!("unknown list: {key}") }).to_string(),
        );
    };
    let Some(overview) = state.coordinator.current() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            serde_json::json!({ "error": "no data yet" }).to_string(),
        );
    };

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        serde_json::json!(list.items(&overview)).to_string(),
    )
}

/// Wait for SIGTERM or SIGINT for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
