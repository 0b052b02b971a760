//! Authentication route handlers: admin login and current user.
//!
//! Endpoints:
//! - `POST /api/auth/login`: JSON `{username, password}` login
//! - `POST /api/auth/token`: the same login as a form post (OAuth2 password flow shape)
//! - `GET  /api/users/me`: returns the authenticated admin (protected)

use crate::api::handlers::{AppError, PortfolioState};
use crate::auth::jwt::{encode_jwt, user_id_for, Claims};
use crate::auth::verify_admin;
use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ============================================================================
// Request / Response types
// ============================================================================

/// Request body for POST /api/auth/login and /api/auth/token
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenUser {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: TokenUser,
}

/// Response for GET /api/users/me
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub token_expires_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Extractor
// ============================================================================

/// The admin account behind a request that passed `require_auth`.
///
/// Profile fields come from the current configuration rather than the token,
/// so a token minted before an account rename no longer resolves.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
    pub email: String,
    pub token_expires_at: Option<DateTime<Utc>>,
}

impl FromRequestParts<PortfolioState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortfolioState,
    ) -> Result<Self, Self::Rejection> {
        let claims = parts
            .extensions
            .get::<Claims>()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let admin = &state.auth_config.admin;
        if claims.username != admin.username {
            return Err(AppError::Forbidden("Admin privileges required".to_string()));
        }

        Ok(Self {
            username: admin.username.clone(),
            email: admin.email.clone(),
            token_expires_at: DateTime::from_timestamp(claims.exp, 0),
        })
    }
}

// ============================================================================
// Handlers
// ============================================================================

fn issue_token(state: &PortfolioState, req: &LoginRequest) -> Result<AuthTokenResponse, AppError> {
    let auth_config = &state.auth_config;

    if !verify_admin(&auth_config.admin, &req.username, &req.password) {
        warn!(username = %req.username, "Rejected admin login");
        return Err(AppError::Unauthorized("Invalid credentials".to_string()));
    }

    let admin = &auth_config.admin;
    let token = encode_jwt(
        user_id_for(&admin.username),
        &admin.username,
        &admin.email,
        &auth_config.jwt_secret,
        auth_config.jwt_expiry_secs,
    )?;

    info!(username = %admin.username, "Admin logged in");

    Ok(AuthTokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: TokenUser {
            username: admin.username.clone(),
        },
    })
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<PortfolioState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, AppError> {
    Ok(Json(issue_token(&state, &req)?))
}

/// POST /api/auth/token
pub async fn token(
    State(state): State<PortfolioState>,
    Form(req): Form<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, AppError> {
    Ok(Json(issue_token(&state, &req)?))
}

/// GET /api/users/me
pub async fn get_me(admin: AdminUser) -> Json<UserResponse> {
    Json(UserResponse {
        username: admin.username,
        email: admin.email,
        is_active: true,
        token_expires_at: admin.token_expires_at,
    })
}
