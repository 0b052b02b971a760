//! HTTP API for the portfolio

pub mod auth_handlers;
pub mod change_handlers;
pub mod content_handlers;
pub mod handlers;
pub mod query;
pub mod routes;
pub mod upload_handlers;
pub mod ws_handlers;

pub use handlers::{AppError, PortfolioState, ServerState};
pub use query::*;
pub use routes::create_router;
