//! WebSocket stream of change notifications for remote site contexts

use super::handlers::{AppError, PortfolioState};
use super::query::ChangeStreamQuery;
use crate::events::{ChangeNotification, Interest, SlotWrite};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval, Duration};
use tracing::{debug, warn};

/// WebSocket upgrade handler for `/ws/changes`
///
/// Each connection acts as one more context on the server's shared slot: it
/// sees every write made while it is connected and nothing from before.
pub async fn ws_changes(
    ws: WebSocketUpgrade,
    State(state): State<PortfolioState>,
    Query(query): Query<ChangeStreamQuery>,
) -> Result<Response, AppError> {
    let interest = query
        .interest()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    Ok(ws
        .on_upgrade(move |socket| handle_ws(socket, state, interest))
        .into_response())
}

/// Decide whether a slot write goes out on a connection.
///
/// Returns the raw payload to send; malformed payloads are dropped.
fn payload_for(write: &SlotWrite, interest: &Interest) -> Option<String> {
    match ChangeNotification::decode(&write.value) {
        Ok(notification) if interest.matches(notification.change_type) => {
            Some(write.value.clone())
        }
        Ok(_) => None,
        Err(e) => {
            warn!("Dropping malformed change payload: {}", e);
            None
        }
    }
}

/// Handle an individual WebSocket connection
async fn handle_ws(socket: WebSocket, state: PortfolioState, interest: Interest) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let mut slot_rx = state.hub.storage().watch(state.hub.key());

    // Ping interval (30s)
    let mut ping_interval = interval(Duration::from_secs(30));
    // Skip the first immediate tick
    ping_interval.tick().await;

    debug!(interest = ?interest, "WebSocket change stream opened");

    loop {
        tokio::select! {
            // Forward slot writes to the client
            result = slot_rx.changed() => {
                if result.is_err() {
                    debug!("Change slot closed, shutting down WebSocket");
                    break;
                }
                let write = slot_rx.borrow_and_update().clone();
                let Some(payload) = write.as_ref().and_then(|w| payload_for(w, &interest)) else {
                    continue;
                };
                if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                    debug!("WebSocket send failed, client disconnected");
                    break;
                }
            }

            // Send periodic pings to detect dead clients
            _ = ping_interval.tick() => {
                if ws_sender.send(Message::Ping(vec![].into())).await.is_err() {
                    debug!("Ping failed, client disconnected");
                    break;
                }
            }

            // Handle incoming messages from the client (Pong, Close)
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {}", e);
                        break;
                    }
                    _ => {
                        // Clients only listen
                    }
                }
            }
        }
    }

    debug!("WebSocket change stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChangeType;
    use uuid::Uuid;

    fn write_of(value: &str) -> SlotWrite {
        SlotWrite {
            origin: Uuid::new_v4(),
            value: value.to_string(),
        }
    }

    fn encoded(change_type: ChangeType) -> String {
        ChangeNotification::new(change_type).encode().unwrap()
    }

    #[test]
    fn test_matching_payload_is_forwarded_verbatim() {
        let raw = encoded(ChangeType::Projects);
        let interest = Interest::from(ChangeType::Projects);
        assert_eq!(payload_for(&write_of(&raw), &interest), Some(raw));
    }

    #[test]
    fn test_other_category_is_filtered() {
        let interest = Interest::from(ChangeType::Projects);
        assert_eq!(
            payload_for(&write_of(&encoded(ChangeType::Skills)), &interest),
            None
        );
    }

    #[test]
    fn test_all_reaches_every_connection() {
        let interest = Interest::from(ChangeType::About);
        assert!(payload_for(&write_of(&encoded(ChangeType::All)), &interest).is_some());
    }

    #[test]
    fn test_malformed_payload_is_dropped() {
        let interest = Interest::everything();
        assert_eq!(payload_for(&write_of("{not json"), &interest), None);
        assert_eq!(payload_for(&write_of(""), &interest), None);
    }
}
