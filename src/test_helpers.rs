//! Test helper factories and mock state builders
//!
//! `mock_server_state` spawns the hub listener, so call it from inside a
//! tokio runtime (`#[tokio::test]`).
#![allow(dead_code)]

use crate::api::{PortfolioState, ServerState};
use crate::auth::jwt::{encode_jwt, user_id_for};
use crate::content::{ContentStore, InMemoryContentStore};
use crate::events::{ChangeEmitter, ChangeHub, ChangeType, SharedStorage};
use crate::{AdminAccountConfig, AuthConfig, UploadConfig};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const TEST_SECRET: &str = "test-secret-key-for-unit-tests-only";

/// Auth config with the demo admin, hashed at the cheapest bcrypt cost
pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_secs: 1800,
        admin: AdminAccountConfig {
            username: "admin".to_string(),
            email: "admin@portfolio.com".to_string(),
            password_hash: bcrypt::hash("admin123", 4).expect("bcrypt hash"),
        },
    }
}

/// Server state over a seeded store and a fresh storage
pub fn mock_server_state() -> PortfolioState {
    mock_server_state_with(Arc::new(InMemoryContentStore::seeded()))
}

pub fn mock_server_state_with(store: Arc<dyn ContentStore>) -> PortfolioState {
    let hub = Arc::new(ChangeHub::new(Arc::new(SharedStorage::new())));
    Arc::new(ServerState {
        store,
        emitter: hub.clone(),
        hub,
        auth_config: test_auth_config(),
        uploads: UploadConfig {
            dir: std::env::temp_dir().join("portfolio-hub-test-uploads"),
            ..UploadConfig::default()
        },
        allowed_origins: vec!["http://localhost:3000".to_string()],
    })
}

/// Server state whose writes announce into `emitter` instead of the hub
pub fn mock_server_state_emitting(emitter: Arc<dyn ChangeEmitter>) -> PortfolioState {
    let state = mock_server_state();
    Arc::new(ServerState {
        store: state.store.clone(),
        emitter,
        hub: state.hub.clone(),
        auth_config: state.auth_config.clone(),
        uploads: state.uploads.clone(),
        allowed_origins: state.allowed_origins.clone(),
    })
}

/// Server state storing uploads in `dir`, capped at `max_file_size` bytes
pub fn mock_server_state_with_uploads(dir: &Path, max_file_size: usize) -> PortfolioState {
    let state = mock_server_state();
    Arc::new(ServerState {
        store: state.store.clone(),
        emitter: state.emitter.clone(),
        hub: state.hub.clone(),
        auth_config: state.auth_config.clone(),
        uploads: UploadConfig {
            dir: dir.to_path_buf(),
            max_file_size,
        },
        allowed_origins: state.allowed_origins.clone(),
    })
}

/// Emitter that records every announcement
#[derive(Default)]
pub struct RecordingEmitter {
    pub seen: Mutex<Vec<ChangeType>>,
}

impl RecordingEmitter {
    pub fn seen(&self) -> Vec<ChangeType> {
        self.seen.lock().unwrap().clone()
    }
}

impl ChangeEmitter for RecordingEmitter {
    fn notify(&self, change_type: ChangeType) {
        self.seen.lock().unwrap().push(change_type);
    }
}

/// A valid admin token signed with [`TEST_SECRET`]
pub fn admin_token() -> String {
    encode_jwt(
        user_id_for("admin"),
        "admin",
        "admin@portfolio.com",
        TEST_SECRET,
        1800,
    )
    .expect("encode admin token")
}
