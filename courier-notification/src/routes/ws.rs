use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::Response;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

/// GET /ws/notifications/:recipientId
///
/// Upgrades to a WebSocket and forwards each creation notice for the
/// recipient as a JSON text frame. Delivery is live-only: anything
/// published before the upgrade (or while the client lagged behind the
/// channel buffer) is recoverable through the list endpoints, not here.
pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Path(recipient_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, recipient_id))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, recipient_id: String) {
    let mut subscription = state.service.subscribe_for_recipient(&recipient_id);

    tracing::info!(recipient_id = %recipient_id, "notification socket connected");

    loop {
        tokio::select! {
            payload = subscription.recv() => match payload {
                Ok(payload) => {
                    let text = match serde_json::to_string(&payload) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to serialize push payload");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        recipient_id = %recipient_id,
                        skipped,
                        "subscriber lagged, dropping oldest notices"
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {} // inbound frames are ignored on this feed
                Some(Err(_)) => break,
            },
        }
    }

    tracing::info!(recipient_id = %recipient_id, "notification socket disconnected");
}
