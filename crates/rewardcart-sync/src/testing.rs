//! Hand-written API doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rewardcart_core::{CartOperation, CashbackRate, Money, ProductHit};

use crate::api::{CartApi, SearchApi};
use crate::error::{SyncError, SyncResult};

/// Replays scripted outcomes in order, then succeeds.
#[derive(Default)]
pub struct MockCartApi {
    outcomes: Mutex<VecDeque<SyncResult<()>>>,
    applied: Mutex<Vec<CartOperation>>,
    offline: Mutex<bool>,
}

impl MockCartApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, outcome: SyncResult<()>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    /// Operations that reached `apply`, in call order.
    pub fn applied(&self) -> Vec<CartOperation> {
        self.applied.lock().unwrap().clone()
    }
}

#[async_trait]
impl CartApi for MockCartApi {
    async fn apply(&self, op: &CartOperation) -> SyncResult<()> {
        self.applied.lock().unwrap().push(op.clone());
        if *self.offline.lock().unwrap() {
            return Err(SyncError::ConnectionFailed("connection refused".into()));
        }
        self.outcomes.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }

    async fn health(&self) -> SyncResult<()> {
        if *self.offline.lock().unwrap() {
            Err(SyncError::ConnectionFailed("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

/// Echoes the query back as a single hit and counts calls.
#[derive(Default)]
pub struct MockSearchApi {
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl MockSearchApi {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

#[async_trait]
impl SearchApi for MockSearchApi {
    async fn search(&self, query: &str, _limit: u32) -> SyncResult<Vec<ProductHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if *self.fail.lock().unwrap() {
            return Err(SyncError::Http {
                status: 500,
                message: "search unavailable".into(),
            });
        }
        Ok(vec![ProductHit {
            id: format!("hit-{query}"),
            name: query.to_string(),
            brand: None,
            price: Money::from_cents(10_000),
            cashback_rate: CashbackRate::from_bps(500),
            image_url: None,
        }])
    }
}
