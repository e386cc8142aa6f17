//! Domain Layer
//!
//! Business rules for copy-trade dispatch with no infrastructure
//! dependencies. Aggregates, value objects, domain events and repository
//! traits live here; adapters implement the traits.
//!
//! # Bounded Contexts
//!
//! - [`accounts`]: Trading accounts and target selection
//! - [`allocation`]: Splitting a master quantity across accounts
//! - [`risk_management`]: Pre-dispatch risk and margin checks
//! - [`order_dispatch`]: Master and child order lifecycle
//! - [`fill_simulation`]: Paper-market execution math

pub mod accounts;
pub mod allocation;
pub mod fill_simulation;
pub mod order_dispatch;
pub mod risk_management;
pub mod shared;
