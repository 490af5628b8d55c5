//! Periodic background refresh
//!
//! Spawns a task that refreshes the coordinator on a fixed interval. The
//! coordinator itself decides whether a refresh may touch the network; the
//! task only keeps the clock.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::coordinator::Coordinator;

/// Default refresh cadence.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2 * 60 * 60);

/// Spawn a background task that refreshes every `interval`.
///
/// The first tick is skipped because setup has just run `first_refresh`.
/// Errors are already logged and classified by the coordinator, so the
/// loop simply moves on to the next cycle.
pub fn spawn_refresh_task(
    coordinator: Arc<Coordinator>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            debug!(name = coordinator.name(), "scheduled refresh");
            let _ = coordinator.refresh().await;
        }
    })
}
