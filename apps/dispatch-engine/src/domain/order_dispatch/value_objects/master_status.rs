//! Master order status in the dispatch lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Master order status.
///
/// ```text
/// CREATED -> DISPATCHING -> { PARTIAL | FILLED | FAILED | CANCELLED }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MasterStatus {
    /// Accepted, not yet fanned out.
    Created,
    /// Children created and executing.
    Dispatching,
    /// All children terminal with a mixed outcome.
    Partial,
    /// All children filled.
    Filled,
    /// Cancelled by the operator.
    Cancelled,
    /// Dispatch aborted.
    Failed,
}

impl MasterStatus {
    /// Returns true once no further status change is expected.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Partial | Self::Filled | Self::Cancelled | Self::Failed
        )
    }

    /// Returns true if the transition is allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Created => matches!(next, Self::Dispatching | Self::Failed | Self::Cancelled),
            Self::Dispatching => next.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for MasterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "CREATED"),
            Self::Dispatching => write!(f, "DISPATCHING"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}
