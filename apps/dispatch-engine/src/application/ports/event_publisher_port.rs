//! Event Publisher Port (Driven Port)
//!
//! Interface to the real-time fan-out channel. Delivery is best-effort and
//! at-most-once; there is no replay for late subscribers.

use std::fmt;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

use crate::domain::order_dispatch::OrderEvent;
use crate::domain::shared::{AccountId, MasterOrderId, Symbol, Timestamp, UserId};

/// Fan-out room an event is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// `order:<master id>`
    Order(MasterOrderId),
    /// `account:<account id>`
    Account(AccountId),
    /// `user:<user id>`
    User(UserId),
    /// `symbol:<SYMBOL>`
    Symbol(Symbol),
    /// `presence:accounts`
    PresenceRoster,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Order(id) => write!(f, "order:{id}"),
            Self::Account(id) => write!(f, "account:{id}"),
            Self::User(id) => write!(f, "user:{id}"),
            Self::Symbol(symbol) => write!(f, "symbol:{symbol}"),
            Self::PresenceRoster => f.write_str("presence:accounts"),
        }
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One published message.
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    /// Destination room.
    pub topic: Topic,
    /// Event name, e.g. `order.child.updated`.
    pub event_name: &'static str,
    /// JSON body.
    pub payload: serde_json::Value,
    /// Publish time.
    pub published_at: Timestamp,
}

impl EventEnvelope {
    /// Build an envelope stamped with the current time.
    #[must_use]
    pub fn new(topic: Topic, event_name: &'static str, payload: serde_json::Value) -> Self {
        Self {
            topic,
            event_name,
            payload,
            published_at: Timestamp::now(),
        }
    }
}

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Channel is closed or unreachable.
    #[error("Event publish connection error: {message}")]
    ConnectionError {
        /// Details.
        message: String,
    },

    /// Payload could not be encoded.
    #[error("Event serialization error: {message}")]
    SerializationError {
        /// Details.
        message: String,
    },
}

/// Port for publishing events to the fan-out channel.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish one envelope.
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventPublishError>;

    /// Publish an order event to each of `topics`.
    async fn publish_order_event(
        &self,
        topics: &[Topic],
        event: &OrderEvent,
    ) -> Result<(), EventPublishError> {
        let payload =
            serde_json::to_value(event).map_err(|e| EventPublishError::SerializationError {
                message: e.to_string(),
            })?;
        for topic in topics {
            self.publish(EventEnvelope::new(
                topic.clone(),
                event.event_name(),
                payload.clone(),
            ))
            .await?;
        }
        Ok(())
    }
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish(&self, _envelope: EventEnvelope) -> Result<(), EventPublishError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order_dispatch::{MasterStatus, MasterSummary, MasterSummaryChanged};

    mockall::mock! {
        Publisher {}

        #[async_trait]
        impl EventPublisherPort for Publisher {
            async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventPublishError>;
        }
    }

    fn summary_event() -> OrderEvent {
        OrderEvent::MasterSummary(MasterSummaryChanged {
            master_id: MasterOrderId::new("m-1"),
            status: MasterStatus::Dispatching,
            summary: MasterSummary::default(),
            plan: vec![],
            children: vec![],
            at: Timestamp::now(),
        })
    }

    #[test]
    fn topic_names() {
        assert_eq!(Topic::Order(MasterOrderId::new("m-1")).to_string(), "order:m-1");
        assert_eq!(Topic::Account(AccountId::new("a-1")).to_string(), "account:a-1");
        assert_eq!(Topic::User(UserId::new("u-1")).to_string(), "user:u-1");
        assert_eq!(Topic::Symbol(Symbol::new("infy")).to_string(), "symbol:INFY");
        assert_eq!(Topic::PresenceRoster.to_string(), "presence:accounts");
    }

    #[test]
    fn envelope_serializes_topic_as_string() {
        let envelope = EventEnvelope::new(
            Topic::Order(MasterOrderId::new("m-1")),
            "order.master.summary",
            serde_json::json!({}),
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["topic"], "order:m-1");
        assert_eq!(json["event_name"], "order.master.summary");
    }

    #[tokio::test]
    async fn no_op_publisher_succeeds() {
        let publisher = NoOpEventPublisher;
        let topics = [Topic::Order(MasterOrderId::new("m-1"))];
        assert!(publisher.publish_order_event(&topics, &summary_event()).await.is_ok());
    }

    #[tokio::test]
    async fn order_event_goes_to_every_topic() {
        let mut publisher = MockPublisher::new();
        publisher
            .expect_publish()
            .times(2)
            .withf(|e| e.event_name == "order.master.summary")
            .returning(|_| Ok(()));

        let topics = [
            Topic::Order(MasterOrderId::new("m-1")),
            Topic::User(UserId::new("u-1")),
        ];
        publisher.publish_order_event(&topics, &summary_event()).await.unwrap();
    }

    #[tokio::test]
    async fn first_failure_stops_fan_out() {
        let mut publisher = MockPublisher::new();
        publisher.expect_publish().times(1).returning(|_| {
            Err(EventPublishError::ConnectionError {
                message: "closed".to_string(),
            })
        });

        let topics = [
            Topic::Order(MasterOrderId::new("m-1")),
            Topic::User(UserId::new("u-1")),
        ];
        let result = publisher.publish_order_event(&topics, &summary_event()).await;
        assert!(matches!(result, Err(EventPublishError::ConnectionError { .. })));
    }
}
