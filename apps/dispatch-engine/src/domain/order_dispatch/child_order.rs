//! Child Order Aggregate
//!
//! One account's share of a master order. Status only advances; the
//! cumulative filled quantity never exceeds the order quantity.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::fill::Fill;
use super::value_objects::{ChildStatus, ExecutionFailure, OrderSide, OrderType, ProductType};
use crate::domain::accounts::Broker;
use crate::domain::shared::{
    AccountId, BrokerOrderId, ChildOrderId, ClientOrderId, MasterOrderId, Symbol, Timestamp,
    UserId,
};

/// Parameters for a new child order.
#[derive(Debug, Clone)]
pub struct NewChildOrder {
    /// Parent master.
    pub master_id: MasterOrderId,
    /// Target account.
    pub account_id: AccountId,
    /// Account owner, for user-room notifications.
    pub user_id: Option<UserId>,
    /// Account broker.
    pub broker: Broker,
    /// Symbol.
    pub symbol: Symbol,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Product type.
    pub product_type: ProductType,
    /// Quantity (> 0).
    pub qty: u64,
    /// Limit price for priced orders.
    pub price: Option<Decimal>,
    /// Trigger price for stop orders.
    pub trigger_price: Option<Decimal>,
}

/// Child order timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildTimestamps {
    /// Creation.
    pub created_at: Timestamp,
    /// Broker acknowledgement.
    pub dispatched_at: Option<Timestamp>,
    /// Last change.
    pub updated_at: Timestamp,
    /// Completion.
    pub filled_at: Option<Timestamp>,
}

/// Child order aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildOrder {
    id: ChildOrderId,
    master_id: MasterOrderId,
    account_id: AccountId,
    user_id: Option<UserId>,
    broker: Broker,
    client_order_id: ClientOrderId,
    broker_order_id: Option<BrokerOrderId>,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    product_type: ProductType,
    qty: u64,
    price: Option<Decimal>,
    trigger_price: Option<Decimal>,
    status: ChildStatus,
    filled_qty: u64,
    avg_price: Decimal,
    error: Option<ExecutionFailure>,
    timestamps: ChildTimestamps,
}

impl ChildOrder {
    /// Create a child in `QUEUED` status.
    pub fn new(params: NewChildOrder) -> Result<Self, OrderError> {
        if params.qty == 0 {
            return Err(OrderError::InvalidParameters {
                field: "qty",
                message: "child quantity must be positive".to_string(),
            });
        }
        let now = Timestamp::now();
        Ok(Self {
            id: ChildOrderId::generate(),
            master_id: params.master_id,
            account_id: params.account_id,
            user_id: params.user_id,
            broker: params.broker,
            client_order_id: ClientOrderId::generate_short(),
            broker_order_id: None,
            symbol: params.symbol,
            side: params.side,
            order_type: params.order_type,
            product_type: params.product_type,
            qty: params.qty,
            price: params.price,
            trigger_price: params.trigger_price,
            status: ChildStatus::Queued,
            filled_qty: 0,
            avg_price: Decimal::ZERO,
            error: None,
            timestamps: ChildTimestamps {
                created_at: now,
                dispatched_at: None,
                updated_at: now,
                filled_at: None,
            },
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the child order ID.
    #[must_use]
    pub const fn id(&self) -> &ChildOrderId {
        &self.id
    }

    /// Get the parent master ID.
    #[must_use]
    pub const fn master_id(&self) -> &MasterOrderId {
        &self.master_id
    }

    /// Get the target account.
    #[must_use]
    pub const fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Get the account owner.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// Get the broker.
    #[must_use]
    pub const fn broker(&self) -> Broker {
        self.broker
    }

    /// Get the client order reference.
    #[must_use]
    pub const fn client_order_id(&self) -> &ClientOrderId {
        &self.client_order_id
    }

    /// Get the broker order reference, once placed.
    #[must_use]
    pub const fn broker_order_id(&self) -> Option<&BrokerOrderId> {
        self.broker_order_id.as_ref()
    }

    /// Get the symbol.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Get the side.
    #[must_use]
    pub const fn side(&self) -> OrderSide {
        self.side
    }

    /// Get the order type.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Get the product type.
    #[must_use]
    pub const fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Get the order quantity.
    #[must_use]
    pub const fn qty(&self) -> u64 {
        self.qty
    }

    /// Get the limit price.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Get the trigger price.
    #[must_use]
    pub const fn trigger_price(&self) -> Option<Decimal> {
        self.trigger_price
    }

    /// Get the status.
    #[must_use]
    pub const fn status(&self) -> ChildStatus {
        self.status
    }

    /// Get the cumulative filled quantity.
    #[must_use]
    pub const fn filled_qty(&self) -> u64 {
        self.filled_qty
    }

    /// Get the remaining quantity.
    #[must_use]
    pub const fn remaining_qty(&self) -> u64 {
        self.qty - self.filled_qty
    }

    /// Get the volume-weighted average fill price.
    #[must_use]
    pub const fn avg_price(&self) -> Decimal {
        self.avg_price
    }

    /// Get the failure recorded on rejection or cancellation.
    #[must_use]
    pub const fn error(&self) -> Option<&ExecutionFailure> {
        self.error.as_ref()
    }

    /// Get the timestamps.
    #[must_use]
    pub const fn timestamps(&self) -> &ChildTimestamps {
        &self.timestamps
    }

    /// Returns true once the child reached a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Broker accepted the order.
    pub fn place(&mut self, broker_order_id: BrokerOrderId) -> Result<(), OrderError> {
        self.transition(ChildStatus::Placed)?;
        self.broker_order_id = Some(broker_order_id);
        self.timestamps.dispatched_at = Some(self.timestamps.updated_at);
        Ok(())
    }

    /// Apply an execution and return the resulting fill record.
    ///
    /// Updates the running VWAP (2 dp) and moves to `PARTIAL` or `FILLED`.
    pub fn apply_fill(&mut self, qty: u64, price: Decimal) -> Result<Fill, OrderError> {
        if !self.status.can_fill() {
            return Err(OrderError::CannotFill {
                status: self.status,
            });
        }
        if qty == 0 || qty > self.remaining_qty() {
            return Err(OrderError::FillExceedsRemaining {
                fill_qty: qty,
                remaining_qty: self.remaining_qty(),
            });
        }

        let new_filled = self.filled_qty + qty;
        let notional = self.avg_price * Decimal::from(self.filled_qty) + price * Decimal::from(qty);
        let next = if new_filled == self.qty {
            ChildStatus::Filled
        } else {
            ChildStatus::Partial
        };
        self.transition(next)?;

        self.filled_qty = new_filled;
        self.avg_price = (notional / Decimal::from(new_filled))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if next == ChildStatus::Filled {
            self.timestamps.filled_at = Some(self.timestamps.updated_at);
        }

        Ok(Fill::new(self, qty, price))
    }

    /// Execution failed.
    pub fn reject(&mut self, failure: ExecutionFailure) -> Result<(), OrderError> {
        self.transition(ChildStatus::Rejected)?;
        self.error = Some(failure);
        Ok(())
    }

    /// Stop working the order. Filled quantity is kept.
    pub fn cancel(&mut self, failure: ExecutionFailure) -> Result<(), OrderError> {
        self.transition(ChildStatus::Cancelled)?;
        self.error = Some(failure);
        Ok(())
    }

    fn transition(&mut self, next: ChildStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidChildTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.timestamps.updated_at = Timestamp::now();
        Ok(())
    }
}
