use crate::error::{Result, ServerError};
use live_lobby_core::{LobbyBroadcast, LobbyId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// One broadcast topic per lobby
#[derive(Debug, Clone)]
pub struct TopicHub {
    topics: Arc<RwLock<HashMap<LobbyId, broadcast::Sender<String>>>>,
    capacity: usize,
}

impl TopicHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            topics: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Register a receiver; it sees every message published after this call
    pub fn subscribe(&self, topic: &LobbyId) -> Result<broadcast::Receiver<String>> {
        let mut topics = self
            .topics
            .write()
            .map_err(|e| ServerError::InternalError(e.to_string()))?;
        let sender = topics
            .entry(topic.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Ok(sender.subscribe())
    }

    /// Publish to every current subscriber; returns how many received it
    pub fn publish(&self, topic: &LobbyId, message: &LobbyBroadcast) -> Result<usize> {
        let text = serde_json::to_string(message)
            .map_err(|e| ServerError::InternalError(e.to_string()))?;

        let topics = self
            .topics
            .read()
            .map_err(|e| ServerError::InternalError(e.to_string()))?;

        let delivered = topics
            .get(topic)
            .and_then(|sender| sender.send(text).ok())
            .unwrap_or(0);
        tracing::debug!(%topic, delivered, "📢 Published");
        Ok(delivered)
    }

    /// Drop topics nobody listens to anymore
    pub fn prune(&self) {
        if let Ok(mut topics) = self.topics.write() {
            topics.retain(|_, sender| sender.receiver_count() > 0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_lobby_core::UserId;

    fn start() -> LobbyBroadcast {
        LobbyBroadcast::Start {
            started_by: UserId::parse("t1").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let hub = TopicHub::new(8);
        let topic = LobbyId::parse("L1").unwrap();
        let mut rx = hub.subscribe(&topic).unwrap();

        assert_eq!(hub.publish(&topic, &start()).unwrap(), 1);

        let text = rx.recv().await.unwrap();
        assert!(text.contains("\"start\""));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let hub = TopicHub::new(8);
        let topic = LobbyId::parse("L1").unwrap();

        assert_eq!(hub.publish(&topic, &start()).unwrap(), 0);
    }

    #[test]
    fn test_topics_are_isolated() {
        let hub = TopicHub::new(8);
        let l1 = LobbyId::parse("L1").unwrap();
        let l2 = LobbyId::parse("L2").unwrap();
        let mut rx = hub.subscribe(&l2).unwrap();

        hub.publish(&l1, &start()).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_prune_drops_idle_topics() {
        let hub = TopicHub::new(8);
        let topic = LobbyId::parse("L1").unwrap();
        drop(hub.subscribe(&topic).unwrap());

        hub.prune();
        assert!(hub.topics.read().unwrap().is_empty());
    }
}
