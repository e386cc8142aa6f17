//! Accounts Bounded Context
//!
//! Linked trading accounts and the selector used to target them.

pub mod account;
pub mod repository;
pub mod target_selector;

pub use account::{Account, Broker};
pub use repository::AccountRepository;
pub use target_selector::TargetSelector;
