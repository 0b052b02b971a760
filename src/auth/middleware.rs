//! Auth middleware for Axum routes.
//!
//! Validates JWT Bearer tokens and injects Claims into request extensions.

use crate::api::handlers::{AppError, PortfolioState};
use crate::auth::jwt::decode_jwt;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Middleware that requires a valid admin JWT Bearer token.
///
/// # Behavior
/// 1. Extract `Authorization: Bearer <token>` header → 401 if missing
/// 2. Validate JWT with the configured secret → 401 if invalid/expired
/// 3. Check the token belongs to the configured admin → 403 otherwise
/// 4. Inject `Claims` into request extensions for downstream handlers
pub async fn require_auth(
    State(state): State<PortfolioState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_config = &state.auth_config;

    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".to_string()))?;

    let claims = decode_jwt(token, &auth_config.jwt_secret)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

    if claims.username != auth_config.admin.username {
        debug!(username = %claims.username, "Token subject is not the admin account");
        return Err(AppError::Forbidden(
            "Admin privileges required".to_string(),
        ));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Tests
// ============================================================================
