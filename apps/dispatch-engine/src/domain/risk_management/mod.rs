//! Risk Management Bounded Context
//!
//! Synchronous admission checks run before any child order exists.
//!
//! # Key Concepts
//!
//! - **Basic check**: quantity/price sanity and an order-value ceiling
//! - **Price band**: maximum distance of a limit price from the touch
//! - **Margin**: capital an account must hold for its share

pub mod checks;
pub mod errors;
pub mod margin;

pub use checks::{basic_risk_check, price_band_check};
pub use errors::RiskViolation;
pub use margin::{MarginCheck, required_margin};
