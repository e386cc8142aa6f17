//! Broadcast Fan-out
//!
//! In-process fan-out channel on `tokio::sync::broadcast`. Every subscriber
//! sees every envelope published after it subscribed; there is no replay.
//! Subscribers that fall more than `capacity` events behind lose the
//! oldest ones.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::application::ports::{EventEnvelope, EventPublishError, EventPublisherPort, Topic};

/// Event publisher backed by a broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastEventPublisher {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastEventPublisher {
    /// Create a channel buffering up to `capacity` envelopes per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every envelope.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    /// Receive only envelopes addressed to `topic`.
    #[must_use]
    pub fn subscribe_topic(&self, topic: Topic) -> TopicSubscription {
        TopicSubscription {
            topic,
            receiver: self.sender.subscribe(),
        }
    }

    /// Current number of subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[async_trait]
impl EventPublisherPort for BroadcastEventPublisher {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventPublishError> {
        // A send error only means nobody is listening.
        if self.sender.send(envelope).is_err() {
            tracing::trace!("Event dropped, no subscribers");
        }
        Ok(())
    }
}

/// Receiver filtered to one topic.
#[derive(Debug)]
pub struct TopicSubscription {
    topic: Topic,
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl TopicSubscription {
    /// Topic this subscription listens on.
    #[must_use]
    pub const fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Next envelope for the topic, or `None` once the channel closes.
    ///
    /// Lagging skips the lost events and keeps receiving.
    pub async fn recv(&mut self) -> Option<EventEnvelope> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) if envelope.topic == self.topic => return Some(envelope),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(topic = %self.topic, skipped, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::{AccountId, MasterOrderId};

    fn envelope(topic: Topic) -> EventEnvelope {
        EventEnvelope::new(topic, "order.child.updated", serde_json::json!({"qty": 1}))
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let publisher = BroadcastEventPublisher::new(8);
        assert_eq!(publisher.subscriber_count(), 0);
        assert!(publisher.publish(envelope(Topic::PresenceRoster)).await.is_ok());
    }

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let publisher = BroadcastEventPublisher::new(8);
        let mut rx = publisher.subscribe();
        let order = Topic::Order(MasterOrderId::new("m-1"));
        publisher.publish(envelope(order.clone())).await.unwrap();
        publisher.publish(envelope(Topic::PresenceRoster)).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().topic, order);
        assert_eq!(rx.recv().await.unwrap().topic, Topic::PresenceRoster);
    }

    #[tokio::test]
    async fn topic_subscription_filters() {
        let publisher = BroadcastEventPublisher::new(8);
        let account = Topic::Account(AccountId::new("a-1"));
        let mut sub = publisher.subscribe_topic(account.clone());

        publisher.publish(envelope(Topic::PresenceRoster)).await.unwrap();
        publisher.publish(envelope(account.clone())).await.unwrap();

        let got = sub.recv().await.unwrap();
        assert_eq!(got.topic, account);
        assert_eq!(sub.topic(), &account);
    }

    #[tokio::test]
    async fn late_subscriber_gets_no_replay() {
        let publisher = BroadcastEventPublisher::new(8);
        let _early = publisher.subscribe();
        publisher.publish(envelope(Topic::PresenceRoster)).await.unwrap();

        let mut late = publisher.subscribe();
        assert!(matches!(
            late.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
