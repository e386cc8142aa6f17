//! Master read model DTOs

use serde::{Deserialize, Serialize};

use crate::domain::order_dispatch::{ChildOrder, MasterOrder};

/// A master with its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterView {
    /// Master, with filled quantity and VWAP recomputed from `children`.
    pub master: MasterOrder,
    /// Children in creation order.
    pub children: Vec<ChildOrder>,
}

/// Outcome of a cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelOutcome {
    /// The order was live and is now cancelled.
    Cancelled,
    /// The order was already terminal; nothing changed.
    AlreadyTerminal,
}

/// Result of cancelling a master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelMasterResult {
    /// Master outcome.
    pub outcome: CancelOutcome,
    /// Children moved to `CANCELLED`.
    pub cancelled_children: usize,
}
