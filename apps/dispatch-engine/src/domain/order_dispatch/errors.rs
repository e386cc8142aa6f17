//! Order dispatch errors.

use thiserror::Error;

use super::value_objects::{ChildStatus, MasterStatus};

/// Errors raised by the master and child order aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Invalid child state transition attempted.
    #[error("Invalid child order transition: {from} -> {to}")]
    InvalidChildTransition {
        /// Current status.
        from: ChildStatus,
        /// Attempted status.
        to: ChildStatus,
    },

    /// Invalid master state transition attempted.
    #[error("Invalid master order transition: {from} -> {to}")]
    InvalidMasterTransition {
        /// Current status.
        from: MasterStatus,
        /// Attempted status.
        to: MasterStatus,
    },

    /// Order cannot be filled in current state.
    #[error("Cannot fill child order in status: {status}")]
    CannotFill {
        /// Current status.
        status: ChildStatus,
    },

    /// Fill quantity exceeds remaining quantity.
    #[error("Fill of {fill_qty} exceeds remaining quantity {remaining_qty}")]
    FillExceedsRemaining {
        /// Fill quantity attempted.
        fill_qty: u64,
        /// Remaining quantity.
        remaining_qty: u64,
    },

    /// Invalid order parameters.
    #[error("Invalid order parameter {field}: {message}")]
    InvalidParameters {
        /// Field with invalid value.
        field: &'static str,
        /// Error message.
        message: String,
    },
}
