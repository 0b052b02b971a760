//! Portfolio Hub
//!
//! Backend and client plumbing for a personal portfolio site:
//! - REST content API (public reads, admin-only writes)
//! - Typed "data changed" broadcast from the admin surface to open site contexts
//! - Fetch-with-refresh wrappers that re-run when their content category changes
//! - A reqwest client for the public site and the CLI

pub mod api;
pub mod auth;
pub mod content;
pub mod events;
pub mod refresh;
pub mod site;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub cors: CorsYamlConfig,
    pub auth: AuthConfig,
    pub events: EventsYamlConfig,
    pub uploads: UploadConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

/// Browser origins allowed to call the API (public site + admin panel)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsYamlConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsYamlConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".into(),
                "http://localhost:3001".into(),
            ],
        }
    }
}

/// Change broadcast section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventsYamlConfig {
    /// Slot key shared by emitters and receivers
    pub channel_key: String,
    /// How often remote receivers poll the server slot
    pub poll_interval_ms: u64,
}

impl Default for EventsYamlConfig {
    fn default() -> Self {
        Self {
            channel_key: events::CHANGE_CHANNEL_KEY.into(),
            poll_interval_ms: 1000,
        }
    }
}

/// Admin file uploads (profile picture, CV), served back under `/uploads`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub dir: PathBuf,
    /// Largest accepted file, in bytes
    pub max_file_size: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./uploads"),
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

/// Authentication configuration: one admin account from config, HS256 JWTs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// JWT signing secret (HS256)
    pub jwt_secret: String,
    /// JWT token lifetime in seconds (default: 1800 = 30min)
    pub jwt_expiry_secs: u64,
    pub admin: AdminAccountConfig,
}

/// Demo secret; replace it in any real deployment
pub const DEFAULT_JWT_SECRET: &str = "your-super-secret-key-change-this-in-production-please";

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.into(),
            jwt_expiry_secs: 1800,
            admin: AdminAccountConfig::default(),
        }
    }
}

/// Admin account, verified in-memory.
///
/// `password_hash` may hold a bcrypt hash (used as-is) or a plaintext
/// password (hashed with bcrypt at startup, with a warning log).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminAccountConfig {
    pub username: String,
    pub email: String,
    #[serde(alias = "password")]
    pub password_hash: String,
}

impl Default for AdminAccountConfig {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            email: "admin@portfolio.com".into(),
            password_hash: "admin123".into(),
        }
    }
}

impl AdminAccountConfig {
    /// Whether the account still uses the well-known demo credentials
    pub fn is_demo(&self) -> bool {
        self.username == "admin" && self.password_hash == "admin123"
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub server_port: u16,
    pub allowed_origins: Vec<String>,
    pub auth_config: AuthConfig,
    pub channel_key: String,
    pub poll_interval: Duration,
    pub uploads: UploadConfig,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        let mut auth_config = yaml.auth;
        if let Ok(secret) = std::env::var("JWT_SECRET") {
            auth_config.jwt_secret = secret;
        }
        if let Ok(username) = std::env::var("ADMIN_USERNAME") {
            auth_config.admin.username = username;
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            auth_config.admin.password_hash = password;
        }

        let mut allowed_origins = yaml.cors.allowed_origins;
        for var in ["FRONTEND_URL", "ADMIN_URL"] {
            if let Ok(url) = std::env::var(var) {
                let url = url.trim_end_matches('/').to_string();
                if !url.is_empty() && !allowed_origins.contains(&url) {
                    allowed_origins.push(url);
                }
            }
        }

        let mut uploads = yaml.uploads;
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            uploads.dir = PathBuf::from(dir);
        }
        if let Some(size) = std::env::var("MAX_FILE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            uploads.max_file_size = size;
        }

        Ok(Self {
            host: std::env::var("SERVER_HOST").unwrap_or(yaml.server.host),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            allowed_origins,
            auth_config,
            channel_key: yaml.events.channel_key,
            poll_interval: Duration::from_millis(yaml.events.poll_interval_ms.max(1)),
            uploads,
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.server_port)
    }
}

// ============================================================================
// Server
// ============================================================================

/// Build the server state: seeded in-memory content, the server's change hub
/// and the upload directory
pub fn build_state(mut config: Config) -> Result<api::PortfolioState> {
    if config.auth_config.admin.is_demo() {
        warn!("Using the demo admin credentials (admin/admin123); set ADMIN_USERNAME and ADMIN_PASSWORD");
    }
    if config.auth_config.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("Using the default JWT secret; set JWT_SECRET");
    }
    auth::prepare_admin_password(&mut config.auth_config.admin, auth::BCRYPT_COST)?;

    std::fs::create_dir_all(&config.uploads.dir).with_context(|| {
        format!(
            "Failed to create upload directory {}",
            config.uploads.dir.display()
        )
    })?;

    let storage = Arc::new(events::SharedStorage::new());
    let hub = Arc::new(events::ChangeHub::with_key(
        storage,
        config.channel_key.clone(),
    ));

    Ok(Arc::new(api::ServerState {
        store: Arc::new(content::InMemoryContentStore::seeded()),
        emitter: hub.clone(),
        hub,
        auth_config: config.auth_config,
        uploads: config.uploads,
        allowed_origins: config.allowed_origins,
    }))
}

/// Bind and serve the HTTP API until the process is stopped
pub async fn start_server(config: Config) -> Result<()> {
    let addr = config.bind_address();
    let state = build_state(config)?;
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Portfolio API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
