//! Data-change broadcast for the portfolio
//!
//! This module provides:
//! - `ChangeType` / `ChangeNotification`: the "content X changed" signal and its wire payload
//! - `SharedStorage`: the keyed last-write-wins slots contexts communicate through
//! - `ChangeHub`: one context's emitter and subscriber registry on the bus
//! - `RemoteChangeBridge`: polls a remote slot into local storage for out-of-process receivers

mod bridge;
mod hub;
mod registry;
mod slot;
mod types;

pub use bridge::{ChangeSource, RemoteChangeBridge, DEFAULT_POLL_INTERVAL};
pub use hub::ChangeHub;
pub use registry::{
    ChangeHandler, ChangePredicate, DispatchReport, Subscription, SubscriptionId,
    SubscriptionRegistry,
};
pub use slot::{ContextId, SharedStorage, SlotWrite};
pub use types::{
    ChangeEmitter, ChangeNotification, ChangeType, DecodeError, Interest, UnknownChangeType,
    CHANGE_CHANNEL_KEY,
};
