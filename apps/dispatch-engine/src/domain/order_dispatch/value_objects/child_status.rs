//! Child order status in the execution lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Child order status. Only ever advances.
///
/// ```text
/// QUEUED -> PLACED -> PARTIAL* -> FILLED
///    \________\_________\______-> REJECTED | CANCELLED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChildStatus {
    /// Created, not yet at the broker.
    Queued,
    /// Acknowledged by the broker.
    Placed,
    /// Some quantity filled.
    Partial,
    /// Completely filled.
    Filled,
    /// Stopped before completion.
    Cancelled,
    /// Failed execution.
    Rejected,
}

impl ChildStatus {
    /// Returns true if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled | Self::Rejected)
    }

    /// Returns true if the order can receive fills.
    #[must_use]
    pub const fn can_fill(&self) -> bool {
        matches!(self, Self::Placed | Self::Partial)
    }

    /// Returns true if the transition is allowed.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Queued => matches!(next, Self::Placed | Self::Rejected | Self::Cancelled),
            Self::Placed | Self::Partial => matches!(
                next,
                Self::Partial | Self::Filled | Self::Rejected | Self::Cancelled
            ),
            Self::Filled | Self::Cancelled | Self::Rejected => false,
        }
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "QUEUED"),
            Self::Placed => write!(f, "PLACED"),
            Self::Partial => write!(f, "PARTIAL"),
            Self::Filled => write!(f, "FILLED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}
