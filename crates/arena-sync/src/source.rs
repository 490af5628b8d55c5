//! Overview source abstraction
//!
//! The coordinator only needs "give me the current overview". Putting that
//! behind a trait lets reauth swap in a client with new credentials, and
//! lets tests drive the coordinator with scripted results.

use std::future::Future;
use std::pin::Pin;

use arena_client::{AccountOverview, ArenaClient};

/// Something that can produce a fresh [`AccountOverview`].
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility
/// (`Arc<dyn OverviewSource>`).
pub trait OverviewSource: Send + Sync {
    /// Identifier for logging (the library's base URL for real clients)
    fn id(&self) -> &str;

    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = arena_client::Result<AccountOverview>> + Send + '_>>;
}

impl OverviewSource for ArenaClient {
    fn id(&self) -> &str {
        self.base_url()
    }

    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = arena_client::Result<AccountOverview>> + Send + '_>> {
        Box::pin(self.account_overview())
    }
}
