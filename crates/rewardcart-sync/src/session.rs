//! # Session Store
//!
//! Owns the current [`SessionState`] and publishes every change.
//!
//! ```text
//!   dispatch(action) ──► try_reduce(&current, action) ──► new Arc<SessionState>
//!                                                              │
//!                              watch channel ◄─────────────────┘
//!                              │         │
//!                        RestApi      subscribers
//!                     (bearer token)  (UI, CLI)
//! ```
//!
//! Snapshots are `Arc`s: readers hold a consistent view while writers
//! publish the next one.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

use rewardcart_core::session::{try_reduce, SessionAction, SessionState};
use rewardcart_core::CoreResult;

/// Shared, cloneable handle to the session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Arc<SessionState>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionState::default())
    }
}

impl SessionStore {
    pub fn new(initial: SessionState) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        SessionStore { tx: Arc::new(tx) }
    }

    /// Applies an action. Subscribers are only notified when the state
    /// actually changed.
    ///
    /// ## Returns
    /// The snapshot after the action, or the reducer's error (the state is
    /// then left untouched).
    pub fn dispatch(&self, action: SessionAction) -> CoreResult<Arc<SessionState>> {
        let mut outcome = Ok(());

        self.tx.send_if_modified(|current| match try_reduce(&**current, action) {
            Ok(next) if next != **current => {
                *current = Arc::new(next);
                true
            }
            Ok(_) => false,
            Err(err) => {
                outcome = Err(err);
                false
            }
        });

        outcome?;
        let snapshot = self.snapshot();
        debug!(signed_in = snapshot.is_signed_in(), "Session updated");
        Ok(snapshot)
    }

    /// Current state.
    pub fn snapshot(&self) -> Arc<SessionState> {
        self.tx.borrow().clone()
    }

    /// Receiver that wakes on every change.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
        self.tx.subscribe()
    }

    /// Bearer token for API calls, if signed in.
    pub fn token(&self) -> Option<String> {
        self.tx.borrow().token().map(str::to_string)
    }
}
