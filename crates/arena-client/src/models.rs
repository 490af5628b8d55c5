//! Records extracted from the account overview page
//!
//! Every record shares the [`Material`] fields and adds the fields specific
//! to its kind. All string fields are `None` when the page omits them;
//! nothing is defaulted. Records are plain values rebuilt on every refresh.

use serde::Serialize;

/// Bibliographic fields common to every record on the overview page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Material {
    pub record_id: Option<String>,
    /// Media type as shown by the portal ("Bok", "Ljudbok", ...)
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub year: Option<String>,
}

/// A checked-out item, one row of the loans table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Loan {
    #[serde(flatten)]
    pub material: Material,
    pub loan_date: Option<String>,
    pub expire_date: Option<String>,
    pub renewable: bool,
}

/// A hold still waiting in the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reservation {
    #[serde(flatten)]
    pub material: Material,
    pub created_date: Option<String>,
    pub expire_date: Option<String>,
    pub queue_number: Option<String>,
    pub pickup_library: Option<String>,
}

/// A hold that is waiting on the pickup shelf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReadyReservation {
    #[serde(flatten)]
    pub material: Material,
    pub created_date: Option<String>,
    /// Last day the item can be collected
    pub pickup_date: Option<String>,
    pub reservation_number: Option<String>,
    pub pickup_library: Option<String>,
}

/// A reservation fragment classified by whether it carries a pickup number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReservationRecord {
    Active(Reservation),
    Ready(ReadyReservation),
}

/// Everything published from one overview page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountOverview {
    pub loans: Vec<Loan>,
    pub active_reservations: Vec<Reservation>,
    pub ready_reservations: Vec<ReadyReservation>,
}

impl AccountOverview {
    /// Record counts as (loans, active, ready), for logs and gauges.
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.loans.len(),
            self.active_reservations.len(),
            self.ready_reservations.len(),
        )
    }
}
