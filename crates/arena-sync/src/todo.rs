//! To-do list projection
//!
//! Two lists per account: `checked_out` (loans, due on their return date)
//! and `holds` (queued reservations first, then those ready for pickup).

use arena_client::{AccountOverview, Loan, ReadyReservation, Reservation};
use serde::Serialize;
use time::Date;
use time::macros::format_description;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    NeedsAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodoItem {
    pub uid: String,
    pub summary: String,
    pub status: Option<TodoStatus>,
    pub due: Option<Date>,
    pub description: String,
}

/// The to-do lists published for an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoList {
    CheckedOut,
    Holds,
}

impl TodoList {
    pub const ALL: [TodoList; 2] = [TodoList::CheckedOut, TodoList::Holds];

    pub fn key(&self) -> &'static str {
        match self {
            TodoList::CheckedOut => "checked_out",
            TodoList::Holds => "holds",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|list| list.key() == key)
    }

    /// Stable per-account identifier, `<account id>-<list key>`.
    pub fn unique_id(&self, account_id: &str) -> String {
        format!("{account_id}-{}", self.key())
    }

    pub fn items(&self, overview: &AccountOverview) -> Vec<TodoItem> {
        let items = match self {
            TodoList::CheckedOut => checked_out_items(&overview.loans),
            TodoList::Holds => {
                hold_items(&overview.active_reservations, &overview.ready_reservations)
            }
        };
        debug!(list = self.key(), items = items.len(), "projected to-do items");
        items
    }
}

pub fn checked_out_items(loans: &[Loan]) -> Vec<TodoItem> {
    loans
        .iter()
        .map(|loan| TodoItem {
            uid: loan.material.record_id.clone().unwrap_or_default(),
            summary: loan.material.title.clone().unwrap_or_default(),
            status: Some(TodoStatus::NeedsAction),
            due: parse_date(loan.expire_date.as_deref()),
            description: if loan.renewable {
                "Can be renewed".into()
            } else {
                "Can not be renewed".into()
            },
        })
        .collect()
}

pub fn hold_items(active: &[Reservation], ready: &[ReadyReservation]) -> Vec<TodoItem> {
    let queued = active.iter().map(|reservation| TodoItem {
        uid: reservation.material.record_id.clone().unwrap_or_default(),
        summary: reservation.material.title.clone().unwrap_or_default(),
        status: None,
        due: None,
        description: format!(
            "Queue number {}",
            reservation.queue_number.as_deref().unwrap_or("unknown")
        ),
    });
    let waiting = ready.iter().map(|reservation| TodoItem {
        uid: reservation.material.record_id.clone().unwrap_or_default(),
        summary: reservation.material.title.clone().unwrap_or_default(),
        status: Some(TodoStatus::NeedsAction),
        due: parse_date(reservation.pickup_date.as_deref()),
        description: format!(
            "Ready for pickup at {}",
            reservation.pickup_library.as_deref().unwrap_or("the library")
        ),
    });
    queued.chain(waiting).collect()
}

/// ISO `YYYY-MM-DD`; anything else leaves the item undated.
fn parse_date(value: Option<&str>) -> Option<Date> {
    let value = value?;
    match Date::parse(value, format_description!("[year]-[month]-[day]")) {
        Ok(date) => Some(date),
        Err(e) => {
            debug!(value, error = %e, "unparseable date, leaving item undated");
            None
        }
    }
}
