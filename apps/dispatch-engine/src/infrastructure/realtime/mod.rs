//! Real-time Adapters
//!
//! In-process fan-out channel and the connection lifecycle adapter.

pub mod broadcast;
pub mod connection_hub;

pub use broadcast::{BroadcastEventPublisher, TopicSubscription};
pub use connection_hub::{ConnectionHub, ROSTER_CHANGED_EVENT, RosterChanged};
