//! API route definitions

use super::handlers::{self, PortfolioState};
use super::{auth_handlers, change_handlers, content_handlers, upload_handlers, ws_handlers};
use crate::auth::middleware::require_auth;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// CORS restricted to the configured site and admin origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Routes anyone may call: reads, login, the contact form and change feeds
fn public_routes() -> Router<PortfolioState> {
    Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health))
        // ====================================================================
        // Auth
        // ====================================================================
        .route("/api/auth/login", post(auth_handlers::login))
        .route("/api/auth/token", post(auth_handlers::token))
        // ====================================================================
        // Content reads
        // ====================================================================
        .route("/api/about/info", get(content_handlers::get_about))
        .route(
            "/api/about/highlights",
            get(content_handlers::list_highlights),
        )
        .route("/api/experience", get(content_handlers::list_experiences))
        .route(
            "/api/experience/{id}",
            get(content_handlers::get_experience),
        )
        .route("/api/projects", get(content_handlers::list_projects))
        .route("/api/projects/{id}", get(content_handlers::get_project))
        .route("/api/skills", get(content_handlers::list_skills))
        .route("/api/skills/grouped", get(content_handlers::skills_grouped))
        .route(
            "/api/skills/categories",
            get(content_handlers::skill_categories),
        )
        .route("/api/skills/{id}", get(content_handlers::get_skill))
        .route("/api/contact/info", get(content_handlers::get_contact_info))
        .route(
            "/api/contact/messages",
            post(content_handlers::create_message),
        )
        // ====================================================================
        // Change feeds
        // ====================================================================
        .route(
            "/api/changes/latest",
            get(change_handlers::latest_change),
        )
        .route("/ws/changes", get(ws_handlers::ws_changes))
}

/// Admin-only routes; every content write here announces its category
fn admin_routes(state: &PortfolioState) -> Router<PortfolioState> {
    Router::new()
        .route("/api/users/me", get(auth_handlers::get_me))
        .route(
            "/api/about/info",
            post(content_handlers::create_about).put(content_handlers::update_about),
        )
        .route(
            "/api/about/highlights",
            post(content_handlers::create_highlight),
        )
        .route(
            "/api/about/highlights/{id}",
            put(content_handlers::update_highlight).delete(content_handlers::delete_highlight),
        )
        .route(
            "/api/experience",
            post(content_handlers::create_experience),
        )
        .route(
            "/api/experience/{id}",
            put(content_handlers::update_experience).delete(content_handlers::delete_experience),
        )
        .route("/api/projects", post(content_handlers::create_project))
        .route(
            "/api/projects/{id}",
            put(content_handlers::update_project).delete(content_handlers::delete_project),
        )
        .route("/api/skills", post(content_handlers::create_skill))
        .route(
            "/api/skills/{id}",
            put(content_handlers::update_skill).delete(content_handlers::delete_skill),
        )
        .route(
            "/api/contact/info",
            post(content_handlers::create_contact_info)
                .put(content_handlers::update_contact_info),
        )
        .route(
            "/api/contact/messages",
            get(content_handlers::list_messages),
        )
        .route(
            "/api/contact/messages/{id}/read",
            put(content_handlers::mark_message_read),
        )
        .route(
            "/api/contact/messages/{id}",
            axum::routing::delete(content_handlers::delete_message),
        )
        .route("/api/changes", post(change_handlers::notify_change))
        // ====================================================================
        // Uploads
        // ====================================================================
        .route(
            "/api/upload/image",
            post(upload_handlers::upload_image).layer(DefaultBodyLimit::max(
                upload_handlers::body_limit(state.uploads.max_file_size),
            )),
        )
        .route("/api/upload/files", get(upload_handlers::list_files))
        .route(
            "/api/upload/files/{filename}",
            axum::routing::delete(upload_handlers::delete_file),
        )
        .layer(from_fn_with_state(state.clone(), require_auth))
}

/// Create the API router
pub fn create_router(state: PortfolioState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    public_routes()
        .merge(admin_routes(&state))
        .nest_service("/uploads", ServeDir::new(&state.uploads.dir))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
