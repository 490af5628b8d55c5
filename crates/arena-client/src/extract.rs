//! Record extraction from the account overview page
//!
//! Pure transform of already-fetched HTML. Missing containers yield empty
//! lists and missing fields yield `None`; extraction never fails.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use crate::models::{AccountOverview, Loan, Material, ReadyReservation, Reservation, ReservationRecord};
use crate::selectors;

const RENEWABLE_CLASS: &str = "arena-renewal-true";

#[derive(Debug)]
pub struct Extractor {
    document: Html,
}

impl Extractor {
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Extract all three published lists.
    #[instrument(skip(self))]
    pub fn overview(&self) -> AccountOverview {
        let mut active_reservations = Vec::new();
        let mut ready_reservations = Vec::new();
        for record in self.reservations() {
            match record {
                ReservationRecord::Active(r) => active_reservations.push(r),
                ReservationRecord::Ready(r) => ready_reservations.push(r),
            }
        }
        AccountOverview {
            loans: self.loans(),
            active_reservations,
            ready_reservations,
        }
    }

    /// One [`Loan`] per row of `table#loansTable`.
    pub fn loans(&self) -> Vec<Loan> {
        let Some(table) = self.document.select(&selectors::LOANS_TABLE).next() else {
            debug!("no loans table");
            return Vec::new();
        };
        let loans: Vec<Loan> = table_rows(table).into_iter().map(loan).collect();
        debug!(loans = loans.len(), "loans table found");
        loans
    }

    /// Every reservation fragment, classified active or ready.
    pub fn reservations(&self) -> Vec<ReservationRecord> {
        let Some(container) = self.document.select(&selectors::RESERVATIONS).next() else {
            debug!("no reservations portlet");
            return Vec::new();
        };
        let records: Vec<ReservationRecord> = container
            .select(&selectors::LIBRARY_RECORD)
            .map(classify)
            .collect();
        debug!(reservations = records.len(), "reservations portlet found");
        records
    }

    pub fn active_reservations(&self) -> Vec<Reservation> {
        self.reservations()
            .into_iter()
            .filter_map(|record| match record {
                ReservationRecord::Active(r) => Some(r),
                ReservationRecord::Ready(_) => None,
            })
            .collect()
    }

    pub fn ready_reservations(&self) -> Vec<ReadyReservation> {
        self.reservations()
            .into_iter()
            .filter_map(|record| match record {
                ReservationRecord::Ready(r) => Some(r),
                ReservationRecord::Active(_) => None,
            })
            .collect()
    }
}

/// Classify a reservation fragment: a pickup-number cell means it is ready.
pub fn classify(fragment: ElementRef<'_>) -> ReservationRecord {
    if fragment.select(&selectors::PICKUP_FIELD).next().is_some() {
        ReservationRecord::Ready(ready_reservation(fragment))
    } else {
        ReservationRecord::Active(reservation(fragment))
    }
}

/// Rows directly under the table. The HTML parser wraps bare `<tr>` in an
/// implicit `<tbody>`, so rows one level down inside a `<tbody>` count too.
fn table_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "tbody" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| el.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn select_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().map(text_of)
}

fn material(element: ElementRef<'_>) -> Material {
    Material {
        record_id: select_text(element, &selectors::RECORD_ID),
        kind: select_text(element, &selectors::RECORD_MEDIA),
        title: select_text(element, &selectors::RECORD_TITLE),
        author: select_text(element, &selectors::RECORD_AUTHOR),
        year: select_text(element, &selectors::RECORD_YEAR),
    }
}

fn loan(row: ElementRef<'_>) -> Loan {
    // "Stadsbiblioteket 2025-01-15": the date is the last token
    let loan_date = select_text(row, &selectors::RENEWAL_BRANCH)
        .and_then(|branch| branch.rsplit(' ').next().map(str::to_string));
    Loan {
        material: material(row),
        loan_date,
        expire_date: select_text(row, &selectors::RENEWAL_DATE),
        renewable: row.value().classes().any(|class| class == RENEWABLE_CLASS),
    }
}

fn reservation(fragment: ElementRef<'_>) -> Reservation {
    // "3 av 12" -> "3"
    let queue_number = select_text(fragment, &selectors::QUEUE)
        .and_then(|queue| queue.split_whitespace().next().map(str::to_string));
    Reservation {
        material: material(fragment),
        created_date: select_text(fragment, &selectors::RESERVED_FROM),
        expire_date: select_text(fragment, &selectors::RESERVED_TO),
        queue_number,
        pickup_library: select_text(fragment, &selectors::BRANCH),
    }
}

fn ready_reservation(fragment: ElementRef<'_>) -> ReadyReservation {
    ReadyReservation {
        material: material(fragment),
        created_date: select_text(fragment, &selectors::RESERVED_FROM),
        pickup_date: select_text(fragment, &selectors::PICKUP_EXPIRE),
        reservation_number: select_text(fragment, &selectors::PICKUP_NUMBER),
        pickup_library: select_text(fragment, &selectors::BRANCH),
    }
}
