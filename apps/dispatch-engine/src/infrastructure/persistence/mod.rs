//! Persistence Adapters
//!
//! Implementations of the account and order repository traits.

pub mod in_memory;

pub use in_memory::{InMemoryAccountRepository, InMemoryOrderStore};
