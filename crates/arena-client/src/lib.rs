//! Axiell Arena library portal client
//!
//! Scrapes a patron's "my account" overview page: loans, queued holds and
//! holds ready for pickup. The portal has no API, so the client drives the
//! same HTML pages a browser would and logs in on demand.
//!
//! Flow:
//! 1. `ArenaClient::fetch_account_overview()` GETs the overview page
//! 2. `login::inspect()` reads the login marker; a lapsed session triggers
//!    the login POST sequence
//! 3. `extract::Extractor` turns the HTML into typed records

pub mod client;
pub mod constants;
pub mod error;
pub mod extract;
pub mod login;
pub mod models;
mod selectors;
pub mod session;

pub use client::ArenaClient;
pub use error::{Error, Result};
pub use extract::Extractor;
pub use login::{LoginState, inspect};
pub use models::{AccountOverview, Loan, Material, ReadyReservation, Reservation, ReservationRecord};
pub use session::Session;
