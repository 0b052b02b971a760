//! Keyed shared storage with change signals
//!
//! Every key holds at most one value. Writers overwrite; watchers see only the
//! latest value (a size-1 mailbox per key). Contexts sharing one
//! `SharedStorage` behave like same-origin tabs sharing local storage.

use dashmap::DashMap;
use tokio::sync::watch;
use uuid::Uuid;

/// Identifies the context (tab, server, bridge) that performed a write
pub type ContextId = Uuid;

/// The latest value written under a key, tagged with its writer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotWrite {
    pub origin: ContextId,
    pub value: String,
}

/// Shared key/value slots with per-key change notification
#[derive(Debug, Default)]
pub struct SharedStorage {
    slots: DashMap<String, watch::Sender<Option<SlotWrite>>>,
}

impl SharedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn sender(&self, key: &str) -> watch::Sender<Option<SlotWrite>> {
        self.slots
            .entry(key.to_string())
            .or_insert_with(|| watch::channel(None).0)
            .clone()
    }

    /// Overwrite the value under `key` and signal every watcher.
    pub fn set_item(&self, key: &str, origin: ContextId, value: impl Into<String>) {
        let write = SlotWrite {
            origin,
            value: value.into(),
        };
        // send_replace never fails, even with no receivers
        self.sender(key).send_replace(Some(write));
    }

    /// Current raw value under `key`, if anything was ever written
    pub fn get_item(&self, key: &str) -> Option<String> {
        self.slots
            .get(key)
            .and_then(|tx| tx.borrow().as_ref().map(|w| w.value.clone()))
    }

    /// Current write (value and origin) under `key`
    pub fn latest(&self, key: &str) -> Option<SlotWrite> {
        self.slots.get(key).and_then(|tx| tx.borrow().clone())
    }

    /// Watch `key` for future writes.
    ///
    /// The current value is marked as seen, so a new watcher never replays a
    /// write that happened before it started listening.
    pub fn watch(&self, key: &str) -> watch::Receiver<Option<SlotWrite>> {
        let mut rx = self.sender(key).subscribe();
        rx.borrow_and_update();
        rx
    }

    /// Number of live watchers on `key`
    pub fn watcher_count(&self, key: &str) -> usize {
        self.slots
            .get(key)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_item_empty() {
        let storage = SharedStorage::new();
        assert_eq!(storage.get_item("k"), None);
        assert_eq!(storage.watcher_count("k"), 0);
    }

    #[test]
    fn test_set_overwrites() {
        let storage = SharedStorage::new();
        let origin = Uuid::new_v4();
        storage.set_item("k", origin, "one");
        storage.set_item("k", origin, "two");
        assert_eq!(storage.get_item("k").as_deref(), Some("two"));
        assert_eq!(storage.latest("k").unwrap().origin, origin);
    }

    #[tokio::test]
    async fn test_watch_sees_only_latest_write() {
        let storage = SharedStorage::new();
        let mut rx = storage.watch("k");
        let origin = Uuid::new_v4();

        storage.set_item("k", origin, "first");
        storage.set_item("k", origin, "second");

        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.value, "second");
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_watch_does_not_replay_existing_value() {
        let storage = SharedStorage::new();
        storage.set_item("k", Uuid::new_v4(), "before");

        let rx = storage.watch("k");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_keys_are_independent() {
        let storage = SharedStorage::new();
        let _rx = storage.watch("a");
        storage.set_item("b", Uuid::new_v4(), "x");
        assert_eq!(storage.get_item("a"), None);
        assert_eq!(storage.watcher_count("a"), 1);
        assert_eq!(storage.watcher_count("b"), 0);
    }
}
