pub mod memory;

use tokio::sync::broadcast;

/// Creation notices for one recipient are published here; only sessions
/// subscribed to the recipient's address see them.
pub fn recipient_address(recipient_id: &str) -> String {
    format!("notifications.{recipient_id}")
}

/// Create requests can also arrive over the channel (message-in instead of
/// request/response-in) on this address.
pub const INBOUND_CREATE_ADDRESS: &str = "inbound.notifications.create";

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("channel unavailable: {0}")]
    Unavailable(String),
}

/// A live feed of payloads for one address. Independent per subscriber;
/// cancel by dropping. A subscriber that falls behind the channel capacity
/// observes `Lagged` and continues with newer payloads.
pub type Subscription = broadcast::Receiver<serde_json::Value>;

/// Abstract publish/subscribe broker addressed by recipient identity.
///
/// Publishing is fire-and-forget: it never blocks on subscriber presence
/// and an address with no current subscribers is not an error. Every live
/// subscriber on an address receives every payload published to it, in
/// publish order (broadcast, not competing consumers).
pub trait DeliveryChannel: Send + Sync {
    fn publish(&self, address: &str, payload: &serde_json::Value) -> Result<(), ChannelError>;

    fn subscribe(&self, address: &str) -> Subscription;
}
