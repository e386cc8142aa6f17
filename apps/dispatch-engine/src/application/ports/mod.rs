//! Application Ports (Driven)
//!
//! Interfaces the dispatch pipeline uses to reach the outside world:
//! market quotes, the real-time fan-out channel, randomness and the
//! datastore.

mod event_publisher_port;
mod order_store_port;
mod quote_source_port;
mod random_source_port;

pub use event_publisher_port::{
    EventEnvelope, EventPublishError, EventPublisherPort, NoOpEventPublisher, Topic,
};
pub use order_store_port::OrderStore;
pub use quote_source_port::QuoteSourcePort;
pub use random_source_port::RandomSource;
