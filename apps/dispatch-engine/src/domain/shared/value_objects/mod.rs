//! Shared Value Objects
//!
//! Immutable domain types used across bounded contexts.
//! Value objects are compared by value, not identity.

mod identifiers;
mod money;
mod quote;
mod symbol;
mod timestamp;

pub use identifiers::{
    AccountId, BrokerOrderId, ChildOrderId, ClientOrderId, ConnectionId, FillId, MasterOrderId,
    UserId,
};
pub use money::Money;
pub use quote::Quote;
pub use symbol::Symbol;
pub use timestamp::Timestamp;
