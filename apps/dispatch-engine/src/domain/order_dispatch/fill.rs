//! Fill record: one immutable execution against a child order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::child_order::ChildOrder;
use super::value_objects::OrderSide;
use crate::domain::accounts::Broker;
use crate::domain::shared::{
    AccountId, BrokerOrderId, ChildOrderId, FillId, MasterOrderId, Symbol, Timestamp, UserId,
};

/// An executed trade. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// Fill identifier.
    pub id: FillId,
    /// Executed child.
    pub child_id: ChildOrderId,
    /// Parent master.
    pub master_id: MasterOrderId,
    /// Account that traded.
    pub account_id: AccountId,
    /// Account owner.
    pub user_id: Option<UserId>,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Executed quantity.
    pub qty: u64,
    /// Execution price.
    pub price: Decimal,
    /// Broker.
    pub broker: Broker,
    /// Broker order reference.
    pub broker_order_id: Option<BrokerOrderId>,
    /// Execution time.
    pub filled_at: Timestamp,
}

impl Fill {
    pub(super) fn new(child: &ChildOrder, qty: u64, price: Decimal) -> Self {
        Self {
            id: FillId::generate(),
            child_id: child.id().clone(),
            master_id: child.master_id().clone(),
            account_id: child.account_id().clone(),
            user_id: child.user_id().cloned(),
            symbol: child.symbol().clone(),
            side: child.side(),
            qty,
            price,
            broker: child.broker(),
            broker_order_id: child.broker_order_id().cloned(),
            filled_at: Timestamp::now(),
        }
    }

    /// Notional value of the fill.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}
