//! Allocation errors.

use thiserror::Error;

/// Errors raised while computing an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    /// The allocation mode is not recognised.
    #[error("Unknown allocation mode: {mode}")]
    UnknownMode {
        /// The offending mode string.
        mode: String,
    },

    /// A mode parameter is out of range.
    #[error("Invalid allocation parameter {field}: {message}")]
    InvalidParameter {
        /// Parameter name.
        field: &'static str,
        /// Error message.
        message: String,
    },
}
