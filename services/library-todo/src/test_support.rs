use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;

use arena_client::{AccountOverview, Loan, Material, ReadyReservation, Reservation};
use arena_sync::OverviewSource;

pub const LOGGED_IN: &str =
    include_str!("../../../crates/arena-client/tests/fixtures/logged_in.html");
pub const WRONG_CREDENTIALS: &str =
    include_str!("../../../crates/arena-client/tests/fixtures/login_failed_wrong_credentials.html");

/// Portal stub that answers every overview GET and login POST with `page`.
pub async fn start_portal(page: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let app = Router::new().route(
            "/protected/my-account/overview",
            get(move || async move { axum::response::Html(page) })
                .post(move || async move { axum::response::Html(page) }),
        );
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Source returning the same result on every fetch.
pub struct StaticSource {
    result: Result<AccountOverview, fn() -> arena_client::Error>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn ok(overview: AccountOverview) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(overview),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(error: fn() -> arena_client::Error) -> Arc<Self> {
        Arc::new(Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn with_loans(n: usize) -> Arc<Self> {
        Self::ok(AccountOverview {
            loans: (0..n).map(|i| loan(&format!("rec-{i}"), "2025-02-12")).collect(),
            ..Default::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OverviewSource for StaticSource {
    fn id(&self) -> &str {
        "static"
    }

    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = arena_client::Result<AccountOverview>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = match &self.result {
            Ok(overview) => Ok(overview.clone()),
            Err(make) => Err(make()),
        };
        Box::pin(async move { result })
    }
}

fn material(id: &str, title: &str) -> Material {
    Material {
        record_id: Some(id.into()),
        title: Some(title.into()),
        ..Default::default()
    }
}

pub fn loan(id: &str, expire_date: &str) -> Loan {
    Loan {
        material: material(id, &format!("Title {id}")),
        expire_date: Some(expire_date.into()),
        renewable: true,
        ..Default::default()
    }
}

/// One loan, one queued hold and one hold ready for pickup.
pub fn mixed_overview() -> AccountOverview {
    AccountOverview {
        loans: vec![loan("1385517", "2025-02-12")],
        active_reservations: vec![Reservation {
            material: material("3001122", "Utvandrarna"),
            queue_number: Some("3".into()),
            ..Default::default()
        }],
        ready_reservations: vec![ReadyReservation {
            material: material("3007788", "Kejsarn av Portugallien"),
            pickup_date: Some("2025-01-28".into()),
            pickup_library: Some("Stadsbiblioteket".into()),
            ..Default::default()
        }],
    }
}
