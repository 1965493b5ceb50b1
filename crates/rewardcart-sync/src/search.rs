//! # Debounced Product Search
//!
//! Last request wins.
//!
//! ```text
//!   submit("ri")   ──► abort previous ──► spawn [sleep 300ms ─► search]   ✗ aborted
//!   submit("ric")  ──► abort previous ──► spawn [sleep 300ms ─► search]   ✗ aborted
//!   submit("rice") ──► abort previous ──► spawn [sleep 300ms ─► search] ─► publish
//!                                                                           │
//!                                      watch<SearchState> ◄─────────────────┘
//! ```
//!
//! Every submission bumps a generation counter; a task only publishes if its
//! generation is still current, which covers the window between the request
//! completing and the abort landing. The check runs under the watch lock, so
//! it is ordered against the next submission's own state update.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use rewardcart_core::validation::validate_search_query;
use rewardcart_core::ProductHit;

use crate::api::SearchApi;
use crate::config::SearchSettings;
use crate::error::{SyncError, SyncResult};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub query: String,
    pub results: Vec<ProductHit>,
    pub is_loading: bool,
    pub error: Option<String>,
}

pub struct DebouncedSearch {
    api: Arc<dyn SearchApi>,
    settings: SearchSettings,
    state_tx: Arc<watch::Sender<SearchState>>,
    pending: Option<JoinHandle<()>>,
    generation: Arc<AtomicU64>,
}

impl DebouncedSearch {
    pub fn new(api: Arc<dyn SearchApi>, settings: SearchSettings) -> Self {
        let (state_tx, _rx) = watch::channel(SearchState::default());
        DebouncedSearch {
            api,
            settings,
            state_tx: Arc::new(state_tx),
            pending: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts (or restarts) the debounce timer for `query`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, query: &str) {
        let generation = self.invalidate();

        let query = match validate_search_query(query) {
            Ok(query) => query,
            Err(e) => {
                self.state_tx.send_replace(SearchState {
                    query: query.to_string(),
                    error: Some(e.to_string()),
                    ..Default::default()
                });
                return;
            }
        };

        if query.chars().count() < self.settings.min_query_len {
            self.state_tx.send_replace(SearchState {
                query,
                ..Default::default()
            });
            return;
        }

        // Previous results stay visible while loading
        self.state_tx.send_modify(|s| {
            s.query = query.clone();
            s.is_loading = true;
            s.error = None;
        });

        let api = self.api.clone();
        let state_tx = self.state_tx.clone();
        let current = self.generation.clone();
        let delay = self.settings.debounce();
        let limit = self.settings.result_limit;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            debug!(query = %query, "Searching products");
            let result = api.search(&query, limit).await;
            publish(&state_tx, &current, generation, &query, result);
        }));
    }

    /// Drops any pending or in-flight search.
    pub fn cancel(&mut self) {
        self.invalidate();
        self.state_tx.send_if_modified(|s| {
            let was_loading = s.is_loading;
            s.is_loading = false;
            was_loading
        });
    }

    /// Aborts the outstanding task and returns the new generation.
    fn invalidate(&mut self) -> u64 {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn state(&self) -> SearchState {
        self.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_tx.subscribe()
    }

    /// Waits until no search is loading and returns the resulting state.
    pub async fn settled(&self) -> SyncResult<SearchState> {
        let mut rx = self.state_tx.subscribe();
        let state = rx
            .wait_for(|s| !s.is_loading)
            .await
            .map_err(|_| SyncError::ChannelError("Search state closed".into()))?;
        Ok(state.clone())
    }
}

/// Writes a finished search into the state unless a newer submission has
/// superseded it. Returns whether anything was published.
fn publish(
    state_tx: &watch::Sender<SearchState>,
    current: &AtomicU64,
    generation: u64,
    query: &str,
    result: SyncResult<Vec<ProductHit>>,
) -> bool {
    let published = state_tx.send_if_modified(|s| {
        if current.load(Ordering::SeqCst) != generation {
            return false;
        }

        s.is_loading = false;
        match &result {
            Ok(results) => {
                s.results = results.clone();
                s.error = None;
            }
            Err(e) => {
                s.results.clear();
                s.error = Some(e.to_string());
            }
        }
        true
    });

    if !published {
        debug!(query = %query, "Discarding stale search results");
    } else if let Err(e) = &result {
        warn!(query = %query, error = %e, "Product search failed");
    }
    published
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}
