//! Mirror a remote change slot into local shared storage
//!
//! The public-site client runs in a different process from the server, so it
//! cannot watch the server's storage directly. The bridge polls the remote
//! slot and writes every new payload into a local [`SharedStorage`], where
//! local [`ChangeHub`](super::ChangeHub)s pick it up like any other
//! cross-context write. Payloads are forwarded raw; decoding (and rejecting
//! malformed values) stays with the receiving hubs.

use super::slot::{ContextId, SharedStorage};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::AbortHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default polling period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Somewhere the latest raw change payload can be read from
#[async_trait]
pub trait ChangeSource: Send + Sync {
    /// The payload currently held by the remote slot, if any
    async fn latest_change(&self) -> Result<Option<String>>;
}

/// Background task copying remote slot writes into local storage.
///
/// The value present at start-up is treated as already seen (no replay).
/// Writes that happen between two polls collapse into the last one, matching
/// the slot's own last-write-wins behaviour. Dropping the bridge stops it.
pub struct RemoteChangeBridge {
    id: ContextId,
    task: AbortHandle,
}

impl RemoteChangeBridge {
    pub fn spawn(
        source: Arc<dyn ChangeSource>,
        storage: Arc<SharedStorage>,
        key: impl Into<String>,
        period: Duration,
    ) -> Self {
        let id = Uuid::new_v4();
        let key = key.into();
        let task = tokio::spawn(run_bridge(id, source, storage, key, period)).abort_handle();
        Self { id, task }
    }

    /// Origin id stamped on the writes this bridge performs
    pub fn context_id(&self) -> ContextId {
        self.id
    }
}

impl Drop for RemoteChangeBridge {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_bridge(
    id: ContextId,
    source: Arc<dyn ChangeSource>,
    storage: Arc<SharedStorage>,
    key: String,
    period: Duration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // None until the first successful poll establishes a baseline
    let mut baseline: Option<Option<String>> = None;

    info!(key = %key, period_ms = period.as_millis() as u64, "Remote change bridge started");

    loop {
        ticker.tick().await;

        let current = match source.latest_change().await {
            Ok(current) => current,
            Err(e) => {
                warn!(key = %key, "Polling remote change slot failed: {}", e);
                continue;
            }
        };

        let Some(previous) = baseline.as_ref() else {
            debug!(key = %key, present = current.is_some(), "Remote change baseline recorded");
            baseline = Some(current);
            continue;
        };

        if let Some(value) = current.as_ref() {
            if previous.as_ref() != Some(value) {
                debug!(key = %key, "Forwarding remote change payload");
                storage.set_item(&key, id, value.clone());
            }
        }
        baseline = Some(current);
    }
}
