use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use arena_client::{AccountOverview, Loan, Material};

use crate::source::OverviewSource;

/// Source that replays scripted results and counts fetches.
pub(crate) struct FakeSource {
    results: Mutex<VecDeque<arena_client::Result<AccountOverview>>>,
    calls: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new(results: Vec<arena_client::Result<AccountOverview>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OverviewSource for FakeSource {
    fn id(&self) -> &str {
        "fake"
    }

    fn fetch(
        &self,
    ) -> Pin<Box<dyn Future<Output = arena_client::Result<AccountOverview>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(AccountOverview::default()));
        Box::pin(async move { next })
    }
}

pub(crate) fn overview_with_loans(n: usize) -> AccountOverview {
    AccountOverview {
        loans: (0..n)
            .map(|i| Loan {
                material: Material {
                    record_id: Some(format!("rec-{i}")),
                    title: Some(format!("Title {i}")),
                    ..Default::default()
                },
                expire_date: Some("2025-02-12".into()),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}
