//! Subscriber registry for change notifications

use super::types::{ChangeType, Interest};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, Weak};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// Callback invoked with the category that changed
pub type ChangeHandler = Arc<dyn Fn(ChangeType) + Send + Sync>;

/// Decides whether a non-wildcard notification concerns a subscriber
pub type ChangePredicate = Arc<dyn Fn(ChangeType) -> bool + Send + Sync>;

/// Opaque id of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct GateState {
    closed: bool,
    /// Threads currently inside this subscriber's handler
    running: Vec<ThreadId>,
}

/// Per-subscriber switch shared by the registry entry and its handle.
///
/// Closing waits for handler calls on other threads to return, so no call
/// is in flight once `close` does. A handler closing its own gate does not
/// wait for itself.
#[derive(Default)]
struct Gate {
    state: Mutex<GateState>,
    idle: Condvar,
}

impl Gate {
    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Mark the current thread as running the handler, unless closed
    fn enter(self: &Arc<Self>) -> Option<GatePass> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.running.push(thread::current().id());
        Some(GatePass { gate: self.clone() })
    }

    fn close(&self) {
        let me = thread::current().id();
        let mut state = self.lock();
        state.closed = true;
        while state.running.iter().any(|t| *t != me) {
            state = self.idle.wait(state).unwrap_or_else(|e| e.into_inner());
        }
    }

    fn is_open(&self) -> bool {
        !self.lock().closed
    }
}

/// Held for the duration of one handler call
struct GatePass {
    gate: Arc<Gate>,
}

impl Drop for GatePass {
    fn drop(&mut self) {
        let me = thread::current().id();
        let mut state = self.gate.lock();
        if let Some(pos) = state.running.iter().position(|t| *t == me) {
            state.running.swap_remove(pos);
        }
        drop(state);
        self.gate.idle.notify_all();
    }
}

struct Entry {
    id: SubscriptionId,
    predicate: ChangePredicate,
    handler: ChangeHandler,
    gate: Arc<Gate>,
}

impl Entry {
    fn wants(&self, change_type: ChangeType) -> bool {
        change_type == ChangeType::All || (self.predicate)(change_type)
    }
}

/// Outcome of one dispatch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers whose handler ran to completion
    pub delivered: usize,
    /// Subscribers whose handler panicked
    pub failed: usize,
}

/// Ordered set of subscribers; handlers run in registration order.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // Handlers never run under this lock
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a handler for every category `interest` matches
    pub fn register(
        self: &Arc<Self>,
        interest: Interest,
        handler: ChangeHandler,
    ) -> Subscription {
        let predicate: ChangePredicate = Arc::new(move |t: ChangeType| interest.matches(t));
        self.register_with(predicate, handler)
    }

    /// Register a handler behind an arbitrary predicate.
    ///
    /// The wildcard [`ChangeType::All`] bypasses the predicate.
    pub fn register_with(
        self: &Arc<Self>,
        predicate: ChangePredicate,
        handler: ChangeHandler,
    ) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let gate = Arc::new(Gate::default());
        self.lock().push(Entry {
            id,
            predicate,
            handler,
            gate: gate.clone(),
        });
        debug!(subscription = id.0, "Change subscriber registered");

        Subscription {
            id,
            registry: Arc::downgrade(self),
            gate,
        }
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        before != entries.len()
    }

    /// Invoke every matching, still-active subscriber with `change_type`.
    ///
    /// A panicking handler is logged and skipped; the remaining subscribers
    /// are still notified.
    pub fn dispatch(&self, change_type: ChangeType) -> DispatchReport {
        let targets: Vec<(SubscriptionId, ChangeHandler, Arc<Gate>)> = self
            .lock()
            .iter()
            .filter(|e| e.wants(change_type))
            .map(|e| (e.id, e.handler.clone(), e.gate.clone()))
            .collect();

        let mut report = DispatchReport::default();
        for (id, handler, gate) in targets {
            // Unsubscribed since the snapshot, possibly by an earlier handler
            let Some(_pass) = gate.enter() else {
                continue;
            };
            match catch_unwind(AssertUnwindSafe(|| handler(change_type))) {
                Ok(()) => report.delivered += 1,
                Err(_) => {
                    report.failed += 1;
                    warn!(
                        subscription = id.0,
                        change_type = %change_type,
                        "Change subscriber panicked; continuing with the others"
                    );
                }
            }
        }
        report
    }

    /// Number of registered subscribers
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by registration; unsubscribes on drop.
///
/// Once `unsubscribe` or drop returns, the handler is not running on any
/// other thread and is never invoked again.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<SubscriptionRegistry>,
    gate: Arc<Gate>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn is_active(&self) -> bool {
        self.gate.is_open()
    }

    /// Stop receiving notifications. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}

    fn detach(&self) {
        self.gate.close();
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(subscription = self.id.0, "Change subscriber removed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
