//! Shared Domain Types
//!
//! Value objects and errors shared across bounded contexts.

pub mod errors;
pub mod value_objects;

pub use errors::{DomainError, RepositoryError};
pub use value_objects::{
    AccountId, BrokerOrderId, ChildOrderId, ClientOrderId, ConnectionId, FillId, MasterOrderId,
    Money, Quote, Symbol, Timestamp, UserId,
};
