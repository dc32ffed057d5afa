use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::channel::INBOUND_CREATE_ADDRESS;
use crate::models::CreateNotificationRequest;
use crate::AppState;

/// Listen for create requests arriving over the delivery channel
/// (message-in instead of request/response-in). Each payload goes through
/// the same engine path as the REST surfaces: same validation, forced
/// UNREAD status, publish after persist. Malformed or invalid payloads
/// are logged and dropped.
pub async fn listen_create_requests(state: Arc<AppState>) {
    let mut subscription = state.channel.subscribe(INBOUND_CREATE_ADDRESS);

    tracing::info!(address = INBOUND_CREATE_ADDRESS, "listening for inbound create requests");

    loop {
        match subscription.recv().await {
            Ok(payload) => {
                let request: CreateNotificationRequest = match serde_json::from_value(payload) {
                    Ok(request) => request,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to deserialize inbound create request");
                        continue;
                    }
                };

                match state.service.create(request) {
                    Ok(notification) => {
                        tracing::info!(
                            notification_id = %notification.id,
                            recipient_id = %notification.recipient_id,
                            "notification created from inbound message"
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "failed to create notification from inbound message");
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "inbound create subscriber lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
