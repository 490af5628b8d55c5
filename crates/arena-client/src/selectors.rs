use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

// Login portlet markers.
selector!(LOGIN_PORTLET, "div#portlet_patronLogin_WAR_arenaportlet");
selector!(PATRON_FORM, "div.arena-patron-form");
selector!(FEEDBACK_WARNING, "span.feedbackPanelWARNING");

// Containers.
selector!(LOANS_TABLE, "table#loansTable");
selector!(RESERVATIONS, "div.portlet-myReservations");
selector!(LIBRARY_RECORD, "div.arena-library-record");

// Fields shared by every record.
selector!(RECORD_ID, "span.arena-record-id");
selector!(RECORD_TITLE, "div.arena-record-title span");
selector!(RECORD_MEDIA, "div.arena-record-media span.arena-value");
selector!(RECORD_AUTHOR, "div.arena-record-author span.arena-value");
selector!(RECORD_YEAR, "div.arena-record-year span.arena-value");

// Loans.
selector!(RENEWAL_BRANCH, "div.arena-renewal-branch span.arena-value");
selector!(RENEWAL_DATE, "span.arena-renewal-date-value");

// Reservations.
selector!(RESERVED_FROM, "td.arena-reservation-from-container span.arena-value");
selector!(RESERVED_TO, "td.arena-reservation-to-container span.arena-value");
selector!(QUEUE, "td.arena-record-queue span.arena-value");
selector!(BRANCH, "td.arena-record-branch span.arena-value");
selector!(PICKUP_EXPIRE, "td.arena-record-expire span.arena-value");
selector!(PICKUP_FIELD, "td.arena-record-pickup");
selector!(PICKUP_NUMBER, "td.arena-record-pickup span.arena-value");
