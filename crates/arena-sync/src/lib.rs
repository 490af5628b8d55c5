//! Refresh orchestration for Arena library accounts
//!
//! Sits between the scraping client and whatever displays the results:
//! refreshes on a timer, stops refreshing when the portal rejects the
//! credentials, and projects the records into to-do lists.
//!
//! Account lifecycle:
//! 1. Setup validates the credentials (`validate::validate_credentials`)
//! 2. `Coordinator::first_refresh()` publishes the first overview
//! 3. `spawn_refresh_task()` refreshes every 2 hours
//! 4. Locked account / invalid credentials latch `AuthState::Failed`
//! 5. Reauth validates new credentials and calls `replace_source()`

pub mod coordinator;
pub mod error;
pub mod refresh;
pub mod source;
pub mod todo;
pub mod validate;

#[cfg(test)]
mod test_support;

pub use coordinator::{AuthState, Coordinator, Published, RefreshOutcome};
pub use error::{Error, ErrorClassification, Result, classify};
pub use refresh::{DEFAULT_REFRESH_INTERVAL, spawn_refresh_task};
pub use source::OverviewSource;
pub use todo::{TodoItem, TodoList, TodoStatus};
pub use validate::{SetupError, validate, validate_credentials};
