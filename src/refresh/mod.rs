//! Data fetch with change-driven refresh
//!
//! [`Refreshable`] owns one piece of fetched data. It starts from a fallback
//! value, fetches in the background, and re-fetches whenever the change bus
//! signals that its category was modified. Failures keep the last good data
//! and record the error.

use crate::events::{ChangeHub, ChangeType, Interest, Subscription};
use anyhow::Result;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Observable state of a [`Refreshable`]
#[derive(Debug, Clone, PartialEq)]
pub struct FetchState<T> {
    /// Last successfully fetched value, or the fallback
    pub data: T,
    /// True while at least one fetch is in flight
    pub loading: bool,
    /// Message of the most recent failed fetch; cleared by a success
    pub error: Option<String>,
}

/// Something that can produce a fresh `T`
pub trait Fetcher<T>: Send + Sync {
    fn fetch(&self) -> BoxFuture<'static, Result<T>>;
}

impl<T, F, Fut> Fetcher<T> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    fn fetch(&self) -> BoxFuture<'static, Result<T>> {
        Box::pin(self())
    }
}

struct Inner<T> {
    label: String,
    fetcher: Box<dyn Fetcher<T>>,
    state: watch::Sender<FetchState<T>>,
    in_flight: AtomicUsize,
    runtime: Handle,
}

impl<T> Inner<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn start_fetch(self: &Arc<Self>) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.state.send_modify(|s| s.loading = true);

        let fut = self.fetcher.fetch();
        let inner = self.clone();
        debug!(label = %self.label, "Fetch started");
        self.runtime.spawn(async move {
            let result = fut.await;
            inner.finish(result);
        });
    }

    fn finish(&self, result: Result<T>) {
        let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
        self.state.send_modify(|s| {
            match result {
                Ok(data) => {
                    s.data = data;
                    s.error = None;
                }
                Err(e) => {
                    warn!(label = %self.label, "Fetch failed, keeping previous data: {}", e);
                    s.error = Some(e.to_string());
                }
            }
            s.loading = remaining > 0;
        });
        debug!(label = %self.label, in_flight = remaining, "Fetch finished");
    }
}

/// Fetched data kept fresh by change notifications.
///
/// Every matching notification starts exactly one fetch; there is no
/// debounce, and when fetches overlap the last one to complete wins.
/// Dropping the wrapper unsubscribes; fetches already running complete
/// without effect on anyone.
pub struct Refreshable<T> {
    inner: Arc<Inner<T>>,
    subscription: Option<Subscription>,
}

impl<T> Refreshable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start fetching and, if `refresh_on` is given, subscribe to `hub`.
    ///
    /// `refresh_on = None` registers no subscription at all. An empty
    /// interest registers one that only the `all` wildcard triggers.
    ///
    /// Must be called inside a tokio runtime. The fallback is observable as
    /// soon as this returns.
    pub fn new<F>(
        label: impl Into<String>,
        hub: &ChangeHub,
        fetcher: F,
        fallback: T,
        refresh_on: Option<Interest>,
    ) -> Self
    where
        F: Fetcher<T> + 'static,
    {
        let mut refreshable = Self::detached(label, fetcher, fallback);

        if let Some(interest) = refresh_on {
            let weak: Weak<Inner<T>> = Arc::downgrade(&refreshable.inner);
            let subscription = hub.subscribe(interest, move |change_type: ChangeType| {
                if let Some(inner) = weak.upgrade() {
                    debug!(label = %inner.label, change_type = %change_type, "Refetch triggered");
                    inner.start_fetch();
                }
            });
            refreshable.subscription = Some(subscription);
        }

        refreshable
    }

    /// Fetch once without listening for changes
    pub fn detached<F>(label: impl Into<String>, fetcher: F, fallback: T) -> Self
    where
        F: Fetcher<T> + 'static,
    {
        let (state, _) = watch::channel(FetchState {
            data: fallback,
            loading: false,
            error: None,
        });
        let inner = Arc::new(Inner {
            label: label.into(),
            fetcher: Box::new(fetcher),
            state,
            in_flight: AtomicUsize::new(0),
            runtime: Handle::current(),
        });
        inner.start_fetch();

        Self {
            inner,
            subscription: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn snapshot(&self) -> FetchState<T> {
        self.inner.state.borrow().clone()
    }

    pub fn data(&self) -> T {
        self.inner.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.borrow().error.clone()
    }

    /// Receiver that observes every state transition
    pub fn watch(&self) -> watch::Receiver<FetchState<T>> {
        self.inner.state.subscribe()
    }

    /// Wait for the next state transition and return the new state
    pub async fn changed(&self) -> FetchState<T> {
        let mut rx = self.inner.state.subscribe();
        // The sender lives as long as `self`, so this only returns Ok
        let _ = rx.changed().await;
        let state = rx.borrow_and_update().clone();
        state
    }

    /// Wait until no fetch is in flight
    pub async fn settled(&self) -> FetchState<T> {
        let mut rx = self.inner.state.subscribe();
        let state = match rx.wait_for(|s| !s.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    /// Start a fetch by hand
    pub fn refresh(&self) {
        self.inner.start_fetch();
    }

    /// Whether change notifications can trigger this wrapper
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }
}

impl<T> std::fmt::Debug for Refreshable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Refreshable")
            .field("label", &self.inner.label)
            .field("in_flight", &self.inner.in_flight.load(Ordering::SeqCst))
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}
