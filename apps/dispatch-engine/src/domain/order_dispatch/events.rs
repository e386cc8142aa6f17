//! Domain events for order dispatch.
//!
//! Each event knows its wire name; the payload is the event body itself.

use serde::{Deserialize, Serialize};

use super::child_order::ChildOrder;
use super::fill::Fill;
use super::master_order::{MasterOrder, MasterSummary};
use super::value_objects::{ChildStatus, MasterStatus, OrderSide, OrderType};
use crate::domain::shared::{AccountId, ChildOrderId, MasterOrderId, Money, Symbol, Timestamp};

/// One child in a dispatch plan notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedChild {
    /// Child order.
    pub child_id: ChildOrderId,
    /// Target account.
    pub account_id: AccountId,
    /// Quantity.
    pub qty: u64,
    /// Margin reserved.
    pub required_margin: Money,
}

/// Current status of one child in a summary notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildProgress {
    /// Child order.
    pub child_id: ChildOrderId,
    /// Target account.
    pub account_id: AccountId,
    /// Status.
    pub status: ChildStatus,
    /// Filled so far.
    pub filled_qty: u64,
}

/// A master was accepted and is being dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterCreated {
    /// Master snapshot.
    pub master: MasterOrder,
}

/// An account's share of a newly created master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAssigned {
    /// Master order.
    pub master_id: MasterOrderId,
    /// Account receiving the share.
    pub account_id: AccountId,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// This account's planned quantity.
    pub my_planned_qty: u64,
    /// Margin required for the share.
    pub required_margin: Money,
}

/// Aggregate summary of a master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSummaryChanged {
    /// Master order.
    pub master_id: MasterOrderId,
    /// Master status.
    pub status: MasterStatus,
    /// Aggregate counters.
    pub summary: MasterSummary,
    /// Dispatch plan; only present on the initial plan notification.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plan: Vec<PlannedChild>,
    /// Per-child progress.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ChildProgress>,
    /// When the summary was computed.
    pub at: Timestamp,
}

/// All order dispatch events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderEvent {
    /// Master accepted.
    MasterCreated(MasterCreated),
    /// Per-account share of a master.
    AccountAssigned(AccountAssigned),
    /// Child created in `QUEUED`.
    ChildCreated(ChildOrder),
    /// Child changed status or fill state.
    ChildUpdated(ChildOrder),
    /// Master summary changed.
    MasterSummary(MasterSummaryChanged),
    /// A fill was executed.
    TradeExecuted(Fill),
}

impl OrderEvent {
    /// Wire name of the event.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::MasterCreated(_) | Self::AccountAssigned(_) => "order.master.created",
            Self::ChildCreated(_) => "order.child.created",
            Self::ChildUpdated(_) => "order.child.updated",
            Self::MasterSummary(_) => "order.master.summary",
            Self::TradeExecuted(_) => "trade.new",
        }
    }

    /// Master the event belongs to.
    #[must_use]
    pub fn master_id(&self) -> &MasterOrderId {
        match self {
            Self::MasterCreated(e) => e.master.id(),
            Self::AccountAssigned(e) => &e.master_id,
            Self::ChildCreated(c) | Self::ChildUpdated(c) => c.master_id(),
            Self::MasterSummary(e) => &e.master_id,
            Self::TradeExecuted(f) => &f.master_id,
        }
    }
}
