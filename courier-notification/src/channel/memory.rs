use std::collections::HashMap;
use std::sync::Mutex;

use tokio::sync::broadcast;

use crate::channel::{ChannelError, DeliveryChannel, Subscription};

const DEFAULT_CAPACITY: usize = 256;

/// Reference broker: one `tokio::sync::broadcast` sender per address.
///
/// Sends are non-blocking; a subscriber slower than `capacity` payloads
/// lags (oldest dropped) instead of delaying the publisher. Senders for
/// addresses whose subscribers have all gone are pruned on publish.
pub struct BroadcastDeliveryChannel {
    capacity: usize,
    topics: Mutex<HashMap<String, broadcast::Sender<serde_json::Value>>>,
}

impl BroadcastDeliveryChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            topics: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for BroadcastDeliveryChannel {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DeliveryChannel for BroadcastDeliveryChannel {
    fn publish(&self, address: &str, payload: &serde_json::Value) -> Result<(), ChannelError> {
        let mut topics = self
            .topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(sender) = topics.get(address) {
            if sender.receiver_count() == 0 {
                topics.remove(address);
            } else {
                // send only fails when all receivers are gone, which is
                // the swallowed "no current subscribers" condition
                let _ = sender.send(payload.clone());
            }
        }

        Ok(())
    }

    fn subscribe(&self, address: &str) -> Subscription {
        let mut topics = self
            .topics
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        topics
            .entry(address.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_without_subscribers_is_silent() {
        let channel = BroadcastDeliveryChannel::default();
        channel
            .publish("notifications.nobody", &json!({"hello": "world"}))
            .unwrap();
    }

    #[tokio::test]
    async fn every_subscriber_receives_every_payload() {
        let channel = BroadcastDeliveryChannel::default();
        let mut first = channel.subscribe("notifications.u1");
        let mut second = channel.subscribe("notifications.u1");

        channel.publish("notifications.u1", &json!({"n": 1})).unwrap();
        channel.publish("notifications.u1", &json!({"n": 2})).unwrap();

        assert_eq!(first.recv().await.unwrap(), json!({"n": 1}));
        assert_eq!(first.recv().await.unwrap(), json!({"n": 2}));
        assert_eq!(second.recv().await.unwrap(), json!({"n": 1}));
        assert_eq!(second.recv().await.unwrap(), json!({"n": 2}));
    }

    #[tokio::test]
    async fn addresses_are_isolated() {
        let channel = BroadcastDeliveryChannel::default();
        let mut u1 = channel.subscribe("notifications.u1");
        let mut u2 = channel.subscribe("notifications.u2");

        channel.publish("notifications.u1", &json!({"for": "u1"})).unwrap();

        assert_eq!(u1.recv().await.unwrap(), json!({"for": "u1"}));
        assert!(matches!(
            u2.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn dead_addresses_are_pruned_on_publish() {
        let channel = BroadcastDeliveryChannel::default();
        drop(channel.subscribe("notifications.u1"));

        channel.publish("notifications.u1", &json!({"n": 1})).unwrap();

        let topics = channel.topics.lock().unwrap();
        assert!(!topics.contains_key("notifications.u1"));
    }
}
