//! Allocation Bounded Context
//!
//! Splits a master quantity across candidate accounts.

pub mod engine;
pub mod errors;
pub mod mode;

pub use engine::{Allocation, AllocationEntry, allocate};
pub use errors::AllocationError;
pub use mode::{AllocationMode, AllocationParams};
