//! Shared server state, error type and service endpoints

use crate::content::ContentStore;
use crate::events::{ChangeEmitter, ChangeHub, ChangeType};
use crate::{AuthConfig, UploadConfig};
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub store: Arc<dyn ContentStore>,
    /// Where admin writes announce their category
    pub emitter: Arc<dyn ChangeEmitter>,
    /// The server's context on the change bus, read by the change feeds
    pub hub: Arc<ChangeHub>,
    pub auth_config: AuthConfig,
    pub uploads: UploadConfig,
    /// Browser origins allowed by CORS
    pub allowed_origins: Vec<String>,
}

/// Shared portfolio state
pub type PortfolioState = Arc<ServerState>;

impl ServerState {
    /// Announce that `change_type` content was modified.
    ///
    /// Called only after the store accepted the write; never fails.
    pub fn emit(&self, change_type: ChangeType) {
        self.emitter.notify(change_type);
    }
}

// ============================================================================
// Service endpoints
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Portfolio API is running".to_string(),
    })
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Portfolio API",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/health",
        "changes": "/ws/changes"
    }))
}

/// Body of delete / acknowledge responses
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

// ============================================================================
// Error handling
// ============================================================================

/// Application error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}
