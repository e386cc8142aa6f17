//! Master Order Aggregate Root
//!
//! The single instruction an operator places. It owns the dispatch
//! parameters, the aggregate summary over its children, and an append-only
//! audit trail. Children reference it by id; it never references them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::value_objects::{MasterStatus, OrderSide, OrderType, ProductType, Validity};
use crate::domain::accounts::TargetSelector;
use crate::domain::allocation::{AllocationMode, AllocationParams};
use crate::domain::shared::{MasterOrderId, Symbol, Timestamp, UserId};

/// Aggregate counters over a master's children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSummary {
    /// Σ allocated quantity at planning time.
    pub requested_qty: u64,
    /// Σ quantity of children actually created.
    pub dispatched_qty: u64,
    /// Σ children filled quantity.
    pub filled_qty: u64,
    /// Volume-weighted average fill price across children.
    pub avg_price: Decimal,
}

/// Kind of audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Master accepted.
    Create,
    /// Children created and launched.
    Dispatched,
    /// Dispatch aborted.
    Failed,
    /// Cancelled on request.
    Cancelled,
    /// All children reached a terminal state.
    Completed,
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When it happened.
    pub at: Timestamp,
    /// What happened.
    pub action: AuditAction,
    /// Free-form detail.
    pub detail: String,
}

/// Command to create a new master order.
#[derive(Debug, Clone)]
pub struct CreateMasterCommand {
    /// Placing user.
    pub user_id: Option<UserId>,
    /// Symbol to trade.
    pub symbol: Symbol,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Limit price, if supplied.
    pub price: Option<Decimal>,
    /// Trigger price for stop orders.
    pub trigger_price: Option<Decimal>,
    /// Price used for risk and margin.
    pub effective_price: Decimal,
    /// Product type.
    pub product_type: ProductType,
    /// Validity.
    pub validity: Validity,
    /// Contract lot size.
    pub lot: u32,
    /// Master quantity.
    pub master_qty: u64,
    /// Allocation mode.
    pub allocation_mode: AllocationMode,
    /// Allocation parameters.
    pub allocation_params: AllocationParams,
    /// Target selector.
    pub targets: TargetSelector,
    /// Skip margin-insufficient accounts instead of aborting.
    pub allow_partial: bool,
}

/// Master order aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterOrder {
    id: MasterOrderId,
    user_id: Option<UserId>,
    symbol: Symbol,
    side: OrderSide,
    order_type: OrderType,
    price: Option<Decimal>,
    trigger_price: Option<Decimal>,
    effective_price: Decimal,
    product_type: ProductType,
    validity: Validity,
    lot: u32,
    master_qty: u64,
    allocation_mode: AllocationMode,
    allocation_params: AllocationParams,
    targets: TargetSelector,
    allow_partial: bool,
    status: MasterStatus,
    summary: MasterSummary,
    audit_trail: Vec<AuditEntry>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl MasterOrder {
    /// Create a master order in `CREATED` status.
    #[must_use]
    pub fn new(cmd: CreateMasterCommand) -> Self {
        let now = Timestamp::now();
        Self {
            id: MasterOrderId::generate(),
            user_id: cmd.user_id,
            symbol: cmd.symbol,
            side: cmd.side,
            order_type: cmd.order_type,
            price: cmd.price,
            trigger_price: cmd.trigger_price,
            effective_price: cmd.effective_price,
            product_type: cmd.product_type,
            validity: cmd.validity,
            lot: cmd.lot,
            master_qty: cmd.master_qty,
            allocation_mode: cmd.allocation_mode,
            allocation_params: cmd.allocation_params,
            targets: cmd.targets,
            allow_partial: cmd.allow_partial,
            status: MasterStatus::Created,
            summary: MasterSummary::default(),
            audit_trail: vec![AuditEntry {
                at: now,
                action: AuditAction::Create,
                detail: "master created".to_string(),
            }],
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the master order ID.
    #[must_use]
    pub const fn id(&self) -> &MasterOrderId {
        &self.id
    }

    /// Get the placing user.
    #[must_use]
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
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

    /// Get the supplied limit price.
    #[must_use]
    pub const fn price(&self) -> Option<Decimal> {
        self.price
    }

    /// Get the trigger price.
    #[must_use]
    pub const fn trigger_price(&self) -> Option<Decimal> {
        self.trigger_price
    }

    /// Get the price used for risk and margin.
    #[must_use]
    pub const fn effective_price(&self) -> Decimal {
        self.effective_price
    }

    /// Get the product type.
    #[must_use]
    pub const fn product_type(&self) -> ProductType {
        self.product_type
    }

    /// Get the validity.
    #[must_use]
    pub const fn validity(&self) -> Validity {
        self.validity
    }

    /// Get the lot size.
    #[must_use]
    pub const fn lot(&self) -> u32 {
        self.lot
    }

    /// Get the master quantity.
    #[must_use]
    pub const fn master_qty(&self) -> u64 {
        self.master_qty
    }

    /// Get the allocation mode.
    #[must_use]
    pub const fn allocation_mode(&self) -> AllocationMode {
        self.allocation_mode
    }

    /// Get the allocation parameters.
    #[must_use]
    pub const fn allocation_params(&self) -> &AllocationParams {
        &self.allocation_params
    }

    /// Get the target selector.
    #[must_use]
    pub const fn targets(&self) -> &TargetSelector {
        &self.targets
    }

    /// Whether margin-insufficient accounts are skipped.
    #[must_use]
    pub const fn allow_partial(&self) -> bool {
        self.allow_partial
    }

    /// Get the status.
    #[must_use]
    pub const fn status(&self) -> MasterStatus {
        self.status
    }

    /// Get the summary.
    #[must_use]
    pub const fn summary(&self) -> &MasterSummary {
        &self.summary
    }

    /// Get the audit trail.
    #[must_use]
    pub fn audit_trail(&self) -> &[AuditEntry] {
        &self.audit_trail
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Get the last update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Move to `DISPATCHING` with the planned quantity.
    pub fn begin_dispatch(&mut self, requested_qty: u64) -> Result<(), OrderError> {
        self.transition(MasterStatus::Dispatching)?;
        self.summary.requested_qty = requested_qty;
        Ok(())
    }

    /// Record the quantity actually handed to children.
    pub fn record_dispatched(&mut self, dispatched_qty: u64, children: usize) {
        self.summary.dispatched_qty = dispatched_qty;
        self.audit(
            AuditAction::Dispatched,
            format!("{children} children, {dispatched_qty} qty"),
        );
    }

    /// Abort dispatch.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(MasterStatus::Failed)?;
        self.audit(AuditAction::Failed, reason.into());
        Ok(())
    }

    /// Cancel on request.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(MasterStatus::Cancelled)?;
        self.audit(AuditAction::Cancelled, reason.into());
        Ok(())
    }

    /// Replace filled quantity and average price with freshly aggregated values.
    pub fn apply_fill_summary(&mut self, filled_qty: u64, avg_price: Decimal) {
        self.summary.filled_qty = filled_qty;
        self.summary.avg_price = avg_price;
        self.updated_at = Timestamp::now();
    }

    /// Settle the final status once every child is terminal.
    ///
    /// `FILLED` when every child filled, `FAILED` when nothing filled at all,
    /// `PARTIAL` otherwise. Masters already cancelled or failed are left as set.
    pub fn settle(&mut self, all_filled: bool) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Ok(());
        }
        let next = if all_filled {
            MasterStatus::Filled
        } else if self.summary.filled_qty == 0 {
            MasterStatus::Failed
        } else {
            MasterStatus::Partial
        };
        self.transition(next)?;
        self.audit(
            AuditAction::Completed,
            format!("{} filled of {}", self.summary.filled_qty, self.summary.dispatched_qty),
        );
        Ok(())
    }

    fn transition(&mut self, next: MasterStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidMasterTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    fn audit(&mut self, action: AuditAction, detail: String) {
        self.audit_trail.push(AuditEntry {
            at: Timestamp::now(),
            action,
            detail,
        });
    }
}
