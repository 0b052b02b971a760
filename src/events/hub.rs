//! Change hub: one browsing context's view of the change bus
//!
//! A `ChangeHub` is both the emitter (`notify` / `publish`) and the receiver
//! (`subscribe` / `subscribe_with`) for one context. Hubs sharing a
//! [`SharedStorage`] see each other's notifications through the shared slot;
//! subscribers of the emitting hub itself are dispatched synchronously.
//!
//! Delivery is at-most-once and non-durable: a hub that is not listening when
//! a notification is written never sees it, and two writes landing before a
//! listener wakes up collapse into the last one.

use super::registry::{ChangeHandler, ChangePredicate, Subscription, SubscriptionRegistry};
use super::slot::{ContextId, SharedStorage, SlotWrite};
use super::types::{ChangeEmitter, ChangeNotification, ChangeType, Interest, CHANGE_CHANNEL_KEY};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// One context's endpoint on the change bus.
///
/// Must be created inside a tokio runtime: construction spawns the task that
/// listens for writes from other contexts. Dropping the hub stops it.
pub struct ChangeHub {
    id: ContextId,
    key: String,
    storage: Arc<SharedStorage>,
    registry: Arc<SubscriptionRegistry>,
    listener: AbortHandle,
}

impl ChangeHub {
    /// Join the bus on the well-known [`CHANGE_CHANNEL_KEY`]
    pub fn new(storage: Arc<SharedStorage>) -> Self {
        Self::with_key(storage, CHANGE_CHANNEL_KEY)
    }

    /// Join the bus on a custom slot key
    pub fn with_key(storage: Arc<SharedStorage>, key: impl Into<String>) -> Self {
        let id = Uuid::new_v4();
        let key = key.into();
        let registry = Arc::new(SubscriptionRegistry::new());

        // Subscribe before spawning so no write slips between the two
        let rx = storage.watch(&key);
        let listener = tokio::spawn(listen_cross_context(
            id,
            key.clone(),
            rx,
            Arc::downgrade(&registry),
        ))
        .abort_handle();

        debug!(context = %id, key = %key, "Change hub joined");

        Self {
            id,
            key,
            storage,
            registry,
            listener,
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Arc<SharedStorage> {
        &self.storage
    }

    /// Emit a fresh notification for `change_type`
    pub fn notify(&self, change_type: ChangeType) {
        self.publish(ChangeNotification::new(change_type));
    }

    /// Write `notification` to the shared slot, then dispatch it to this
    /// context's own subscribers.
    ///
    /// Never fails; encoding problems are logged and the in-process dispatch
    /// still happens.
    pub fn publish(&self, notification: ChangeNotification) {
        match notification.encode() {
            Ok(payload) => self.storage.set_item(&self.key, self.id, payload),
            Err(e) => warn!(
                change_type = %notification.change_type,
                "Failed to encode change notification: {}",
                e
            ),
        }

        let report = self.registry.dispatch(notification.change_type);
        debug!(
            context = %self.id,
            change_type = %notification.change_type,
            timestamp = notification.timestamp,
            delivered = report.delivered,
            failed = report.failed,
            "Change notification published"
        );
    }

    /// Register `handler` for every category `interest` matches
    pub fn subscribe<I, F>(&self, interest: I, handler: F) -> Subscription
    where
        I: Into<Interest>,
        F: Fn(ChangeType) + Send + Sync + 'static,
    {
        let handler: ChangeHandler = Arc::new(handler);
        self.registry.register(interest.into(), handler)
    }

    /// Register `handler` behind a custom predicate; `all` always passes.
    pub fn subscribe_with<P, F>(&self, predicate: P, handler: F) -> Subscription
    where
        P: Fn(ChangeType) -> bool + Send + Sync + 'static,
        F: Fn(ChangeType) + Send + Sync + 'static,
    {
        let predicate: ChangePredicate = Arc::new(predicate);
        let handler: ChangeHandler = Arc::new(handler);
        self.registry.register_with(predicate, handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    /// Raw payload currently held by the shared slot
    pub fn latest_raw(&self) -> Option<String> {
        self.storage.get_item(&self.key)
    }

    /// Decoded notification currently held by the shared slot.
    ///
    /// A malformed slot value reads as `None`.
    pub fn latest(&self) -> Option<ChangeNotification> {
        self.latest_raw()
            .and_then(|raw| ChangeNotification::decode(&raw).ok())
    }
}

impl ChangeEmitter for ChangeHub {
    fn notify(&self, change_type: ChangeType) {
        ChangeHub::notify(self, change_type);
    }
}

impl Drop for ChangeHub {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

impl std::fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHub")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("subscribers", &self.registry.len())
            .finish()
    }
}

/// Receive writes made by other contexts and dispatch them locally.
async fn listen_cross_context(
    id: ContextId,
    key: String,
    mut rx: watch::Receiver<Option<SlotWrite>>,
    registry: Weak<SubscriptionRegistry>,
) {
    while rx.changed().await.is_ok() {
        let Some(write) = rx.borrow_and_update().clone() else {
            continue;
        };
        // Own writes were already dispatched in-process
        if write.origin == id {
            continue;
        }
        let Some(subscribers) = registry.upgrade() else {
            break;
        };

        match ChangeNotification::decode(&write.value) {
            Ok(notification) => {
                let report = subscribers.dispatch(notification.change_type);
                debug!(
                    context = %id,
                    origin = %write.origin,
                    change_type = %notification.change_type,
                    delivered = report.delivered,
                    "Cross-context change received"
                );
            }
            Err(e) => {
                warn!(
                    context = %id,
                    key = %key,
                    origin = %write.origin,
                    "Dropping change notification: {}",
                    e
                );
            }
        }
    }
    debug!(context = %id, "Cross-context listener stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn channel_handler(
        tx: mpsc::UnboundedSender<ChangeType>,
    ) -> impl Fn(ChangeType) + Send + Sync + 'static {
        move |t| {
            let _ = tx.send(t);
        }
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<ChangeType>) -> Option<ChangeType> {
        tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .ok()
            .flatten()
    }

    /// Give the listener tasks a chance to run
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn test_same_context_delivery_is_synchronous() {
        let hub = ChangeHub::new(Arc::new(SharedStorage::new()));
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = hub.subscribe(ChangeType::Skills, move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(ChangeType::Skills);
        hub.notify(ChangeType::Skills);
        // No await in between: both dispatches already happened
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_notify_writes_shared_slot() {
        let storage = Arc::new(SharedStorage::new());
        let hub = ChangeHub::new(storage.clone());
        hub.notify(ChangeType::Contact);

        let raw = storage.get_item(CHANGE_CHANNEL_KEY).unwrap();
        let decoded = ChangeNotification::decode(&raw).unwrap();
        assert_eq!(decoded.change_type, ChangeType::Contact);
        assert_eq!(hub.latest().unwrap(), decoded);
    }

    #[tokio::test]
    async fn test_cross_context_delivery() {
        let storage = Arc::new(SharedStorage::new());
        let admin = ChangeHub::new(storage.clone());
        let site = ChangeHub::new(storage);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = site.subscribe(ChangeType::Projects, channel_handler(tx));

        admin.notify(ChangeType::Skills);
        admin.notify(ChangeType::Projects);

        assert_eq!(recv(&mut rx).await, Some(ChangeType::Projects));
    }

    #[tokio::test]
    async fn test_no_self_echo_through_slot() {
        let hub = ChangeHub::new(Arc::new(SharedStorage::new()));
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let _sub = hub.subscribe(Interest::everything(), move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        hub.notify(ChangeType::About);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cross_context_writes_collapse_to_latest() {
        // current-thread runtime: the listener cannot run between the two writes
        let storage = Arc::new(SharedStorage::new());
        let admin = ChangeHub::new(storage.clone());
        let site = ChangeHub::new(storage);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = site.subscribe(Interest::everything(), channel_handler(tx));

        admin.notify(ChangeType::About);
        admin.notify(ChangeType::Skills);

        assert_eq!(recv(&mut rx).await, Some(ChangeType::Skills));
        settle().await;
        assert!(rx.try_recv().is_err(), "the overwritten write is lost");
    }

    #[tokio::test]
    async fn test_malformed_payload_is_dropped() {
        let storage = Arc::new(SharedStorage::new());
        let site = ChangeHub::new(storage.clone());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = site.subscribe(Interest::everything(), channel_handler(tx));

        storage.set_item(CHANGE_CHANNEL_KEY, Uuid::new_v4(), "{\"changeType\":42}");
        settle().await;
        assert!(rx.try_recv().is_err());

        // The listener survived the bad payload
        let admin = ChangeHub::new(storage);
        admin.notify(ChangeType::Highlights);
        assert_eq!(recv(&mut rx).await, Some(ChangeType::Highlights));
    }

    #[tokio::test]
    async fn test_late_joiner_sees_no_backlog() {
        let storage = Arc::new(SharedStorage::new());
        let admin = ChangeHub::new(storage.clone());
        admin.notify(ChangeType::Projects);

        let site = ChangeHub::new(storage);
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = site.subscribe(Interest::everything(), channel_handler(tx));
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_both_paths() {
        let storage = Arc::new(SharedStorage::new());
        let admin = ChangeHub::new(storage.clone());
        let site = ChangeHub::new(storage);

        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        let c2 = count.clone();
        let local = admin.subscribe(ChangeType::About, move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let remote = site.subscribe(ChangeType::About, move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        local.unsubscribe();
        remote.unsubscribe();
        admin.notify(ChangeType::About);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(site.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_custom_key_isolates_buses() {
        let storage = Arc::new(SharedStorage::new());
        let admin = ChangeHub::with_key(storage.clone(), "other_channel");
        let site = ChangeHub::new(storage);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = site.subscribe(Interest::everything(), channel_handler(tx));
        admin.notify(ChangeType::All);
        settle().await;
        assert!(rx.try_recv().is_err());
    }
}
