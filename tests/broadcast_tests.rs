//! Change broadcast integration tests
//!
//! Several hubs sharing one `SharedStorage` stand in for several open tabs of
//! the same site.

use anyhow::anyhow;
use portfolio_hub::events::{
    ChangeHub, ChangeNotification, ChangeType, Interest, SharedStorage, CHANGE_CHANNEL_KEY,
};
use portfolio_hub::refresh::Refreshable;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

fn tabs(n: usize) -> (Arc<SharedStorage>, Vec<ChangeHub>) {
    let storage = Arc::new(SharedStorage::new());
    let hubs = (0..n).map(|_| ChangeHub::new(storage.clone())).collect();
    (storage, hubs)
}

fn forward(tx: mpsc::UnboundedSender<ChangeType>) -> impl Fn(ChangeType) + Send + Sync + 'static {
    move |t| {
        let _ = tx.send(t);
    }
}

async fn next(rx: &mut mpsc::UnboundedReceiver<ChangeType>) -> Option<ChangeType> {
    tokio::time::timeout(Duration::from_millis(500), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Let listener tasks drain
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_interest_filters_across_tabs() {
    let (_storage, hubs) = tabs(2);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = hubs[1].subscribe(ChangeType::Projects, forward(tx));

    hubs[0].notify(ChangeType::Skills);
    settle().await;
    hubs[0].notify(ChangeType::Projects);

    assert_eq!(next(&mut rx).await, Some(ChangeType::Projects));
    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_all_reaches_every_subscriber() {
    let (_storage, hubs) = tabs(2);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _a = hubs[1].subscribe(ChangeType::About, forward(tx.clone()));
    let _b = hubs[1].subscribe(ChangeType::Contact, forward(tx.clone()));
    let _c = hubs[1].subscribe(Interest::none(), forward(tx));

    hubs[0].notify(ChangeType::All);

    for _ in 0..3 {
        assert_eq!(next(&mut rx).await, Some(ChangeType::All));
    }
}

#[tokio::test]
async fn test_no_self_echo() {
    let (_storage, hubs) = tabs(1);
    let count = Arc::new(AtomicUsize::new(0));
    let c = count.clone();
    let _sub = hubs[0].subscribe(ChangeType::About, move |_: ChangeType| {
        c.fetch_add(1, Ordering::SeqCst);
    });

    hubs[0].notify(ChangeType::About);
    settle().await;
    // Only the in-process dispatch, never a second delivery through storage
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_late_tab_sees_no_backlog() {
    let storage = Arc::new(SharedStorage::new());
    let early = ChangeHub::new(storage.clone());
    early.notify(ChangeType::Projects);

    let late = ChangeHub::new(storage.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = late.subscribe(Interest::everything(), forward(tx));

    settle().await;
    assert!(rx.try_recv().is_err());

    // The slot still shows what was last written
    assert_eq!(
        late.latest().map(|n| n.change_type),
        Some(ChangeType::Projects)
    );
}

#[tokio::test]
async fn test_unsubscribe_stops_cross_tab_delivery() {
    let (_storage, hubs) = tabs(2);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sub = hubs[1].subscribe(ChangeType::Skills, forward(tx));

    hubs[0].notify(ChangeType::Skills);
    assert_eq!(next(&mut rx).await, Some(ChangeType::Skills));

    sub.unsubscribe();
    hubs[0].notify(ChangeType::Skills);
    settle().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_malformed_slot_write_is_dropped() {
    let (storage, hubs) = tabs(1);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _sub = hubs[0].subscribe(Interest::everything(), forward(tx));

    let stranger = Uuid::new_v4();
    storage.set_item(CHANGE_CHANNEL_KEY, stranger, "not json at all");
    settle().await;
    storage.set_item(
        CHANGE_CHANNEL_KEY,
        stranger,
        r#"{"changeType":"weather","timestamp":1}"#,
    );
    settle().await;
    assert!(rx.try_recv().is_err());

    // The listener survives and keeps delivering valid writes
    let valid = ChangeNotification::new(ChangeType::Contact).encode().unwrap();
    storage.set_item(CHANGE_CHANNEL_KEY, stranger, valid);
    assert_eq!(next(&mut rx).await, Some(ChangeType::Contact));
}

#[tokio::test]
async fn test_panicking_subscriber_does_not_block_others() {
    let (_storage, hubs) = tabs(2);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let _bad = hubs[1].subscribe(ChangeType::About, |_: ChangeType| panic!("render failed"));
    let _good = hubs[1].subscribe(ChangeType::About, forward(tx));

    hubs[0].notify(ChangeType::About);
    assert_eq!(next(&mut rx).await, Some(ChangeType::About));

    hubs[0].notify(ChangeType::About);
    assert_eq!(next(&mut rx).await, Some(ChangeType::About));
}

#[tokio::test]
async fn test_refreshable_in_other_tab_refetches() {
    let (_storage, hubs) = tabs(2);
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let projects = Refreshable::new(
        "projects",
        &hubs[1],
        move || {
            let n = c.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok::<_, anyhow::Error>(vec![format!("fetch #{}", n)]) }
        },
        vec!["fallback".to_string()],
        Some(Interest::from(ChangeType::Projects)),
    );
    assert_eq!(projects.data(), vec!["fallback".to_string()]);
    assert_eq!(projects.settled().await.data, vec!["fetch #1".to_string()]);

    let mut rx = projects.watch();
    hubs[0].notify(ChangeType::Skills);
    hubs[0].notify(ChangeType::Projects);

    let state = tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|s| !s.loading && s.data == vec!["fetch #2".to_string()]),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(state.error.is_none());
    settle().await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_refresh_failure_keeps_last_good_data() {
    let (_storage, hubs) = tabs(2);
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();

    let about = Refreshable::new(
        "about",
        &hubs[1],
        move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok("Y".to_string())
                } else {
                    Err(anyhow!("API unavailable"))
                }
            }
        },
        "X".to_string(),
        Some(Interest::from(ChangeType::About)),
    );
    assert_eq!(about.data(), "X");
    assert_eq!(about.settled().await.data, "Y");

    let mut rx = about.watch();
    hubs[0].notify(ChangeType::About);
    let state = tokio::time::timeout(
        Duration::from_secs(1),
        rx.wait_for(|s| !s.loading && s.error.is_some()),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();

    assert_eq!(state.data, "Y");
    assert_eq!(state.error.as_deref(), Some("API unavailable"));
}
