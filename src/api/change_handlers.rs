//! Change-slot endpoints for remote contexts that cannot hold a socket open

use super::handlers::{AppError, PortfolioState};
use crate::events::{ChangeNotification, ChangeType};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::debug;

/// GET /api/changes/latest
///
/// Returns the raw payload currently in the slot, or 204 if nothing has been
/// announced since the server started.
pub async fn latest_change(State(state): State<PortfolioState>) -> Response {
    match state.hub.latest_raw() {
        Some(raw) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            raw,
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    pub change_type: String,
}

/// POST /api/changes
///
/// Manual announcement, e.g. after editing content outside the API.
pub async fn notify_change(
    State(state): State<PortfolioState>,
    Json(req): Json<NotifyRequest>,
) -> Result<(StatusCode, Json<ChangeNotification>), AppError> {
    let change_type: ChangeType = req
        .change_type
        .parse()
        .map_err(|e: crate::events::UnknownChangeType| AppError::BadRequest(e.to_string()))?;

    let notification = ChangeNotification::new(change_type);
    debug!(change_type = %change_type, "Manual change announcement");
    state.hub.publish(notification);

    Ok((StatusCode::ACCEPTED, Json(notification)))
}
