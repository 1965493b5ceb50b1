//! Sync events as JSON lines on stdout:
//!
//! ```text
//! {"event":"sync:status","payload":{"state":{...},"label":"pending","message":"..."}}
//! {"event":"sync:progress","payload":{"synced":3,"failed":0,...}}
//! {"event":"sync:error","payload":{"message":"...","retryable":true}}
//! ```

use serde::Serialize;
use serde_json::json;
use tracing::error;

use rewardcart_core::CartSyncState;
use rewardcart_sync::{DrainReport, SyncEventEmitter};

pub struct JsonLinesEmitter;

impl JsonLinesEmitter {
    fn emit<T: Serialize>(&self, event: &str, payload: T) {
        match serde_json::to_string(&json!({ "event": event, "payload": payload })) {
            Ok(line) => println!("{line}"),
            Err(e) => error!(?e, event, "Failed to encode sync event"),
        }
    }
}

impl SyncEventEmitter for JsonLinesEmitter {
    fn emit_status(&self, state: &CartSyncState) {
        self.emit(
            "sync:status",
            json!({
                "state": state,
                "label": state.status_label(),
                "message": state.status_message(),
            }),
        );
    }

    fn emit_progress(&self, report: &DrainReport) {
        self.emit(
            "sync:progress",
            json!({
                "synced": report.synced,
                "failed": report.failed,
                "deferred": report.deferred,
                "interrupted": report.interrupted,
            }),
        );
    }

    fn emit_error(&self, message: &str, retryable: bool) {
        self.emit(
            "sync:error",
            json!({ "message": message, "retryable": retryable }),
        );
    }
}
