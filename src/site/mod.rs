//! Public-site side of the portfolio
//!
//! A [`PublicSite`] is one open "page": a local change hub fed by a bridge
//! that polls the server's change slot, and one refreshable section per
//! content category.

pub mod client;
pub mod fallback;
pub mod sections;

pub use client::PortfolioClient;
pub use sections::SiteSections;

use crate::events::{ChangeHub, RemoteChangeBridge, SharedStorage};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct PublicSite {
    pub hub: ChangeHub,
    pub sections: SiteSections,
    _bridge: RemoteChangeBridge,
}

impl PublicSite {
    /// Mount every section against `client` and start mirroring server changes.
    ///
    /// Must be called inside a tokio runtime.
    pub fn connect(client: PortfolioClient, key: &str, poll_interval: Duration) -> Self {
        let storage = Arc::new(SharedStorage::new());
        let hub = ChangeHub::with_key(storage.clone(), key);
        let sections = SiteSections::mount(&hub, &client);
        info!(server = %client.base_url(), "Public site connected");

        let bridge = RemoteChangeBridge::spawn(Arc::new(client), storage, key, poll_interval);

        Self {
            hub,
            sections,
            _bridge: bridge,
        }
    }
}
