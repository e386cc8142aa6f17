//! Dispatch DTOs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::accounts::{Broker, TargetSelector};
use crate::domain::allocation::{AllocationMode, AllocationParams};
use crate::domain::order_dispatch::{OrderSide, OrderType, PlannedChild, ProductType, Validity};
use crate::domain::shared::{AccountId, MasterOrderId, Money, UserId};

/// A master order placement request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    /// Placing user.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    #[serde(default)]
    pub order_type: OrderType,
    /// Limit price. Optional for market-style orders.
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Trigger price for SL / SL-M.
    #[serde(default)]
    pub trigger_price: Option<Decimal>,
    /// Product type.
    #[serde(default)]
    pub product_type: ProductType,
    /// Validity.
    #[serde(default)]
    pub validity: Validity,
    /// Lot size; falls back to the configured default.
    #[serde(default)]
    pub lot: Option<u32>,
    /// Master quantity.
    pub master_qty: u64,
    /// Allocation mode.
    #[serde(default)]
    pub allocation_mode: AllocationMode,
    /// Allocation parameters.
    #[serde(default)]
    pub allocation_params: AllocationParams,
    /// Target selector.
    #[serde(default)]
    pub targets: TargetSelector,
    /// Skip accounts failing margin instead of aborting the whole dispatch.
    #[serde(default)]
    pub allow_partial: bool,
}

impl DispatchRequest {
    /// A market order for `master_qty` split with `SAME_QTY`.
    #[must_use]
    pub fn market(symbol: impl Into<String>, side: OrderSide, master_qty: u64, same_qty: u64) -> Self {
        Self {
            user_id: None,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            price: None,
            trigger_price: None,
            product_type: ProductType::default(),
            validity: Validity::default(),
            lot: None,
            master_qty,
            allocation_mode: AllocationMode::SameQty,
            allocation_params: AllocationParams::same_qty(same_qty),
            targets: TargetSelector::all(),
            allow_partial: false,
        }
    }
}

/// One account row of a dispatch preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRow {
    /// Account.
    pub account_id: AccountId,
    /// Account display name.
    pub display_name: String,
    /// Broker label.
    pub broker: Broker,
    /// Account capital.
    pub capital: Money,
    /// Allocated quantity.
    pub qty: u64,
    /// Effective price used for margin.
    pub price: Decimal,
    /// Margin the share would require.
    pub required_margin: Money,
    /// Whether capital covers the margin.
    pub margin_ok: bool,
}

/// Preview totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewTotals {
    /// Σ allocated quantity.
    pub requested_qty: u64,
    /// Σ quantity of rows passing margin.
    pub pass_qty: u64,
    /// Σ required margin of rows passing margin.
    pub total_required_margin: Money,
}

/// Side-effect free dispatch plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchPreview {
    /// Symbol.
    pub symbol: String,
    /// Side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Price used for risk and margin.
    pub effective_price: Decimal,
    /// Rows with qty > 0, in candidate order.
    pub rows: Vec<PreviewRow>,
    /// Totals.
    pub totals: PreviewTotals,
}

/// An account skipped for insufficient margin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginFailure {
    /// Account.
    pub account_id: AccountId,
    /// Quantity it was allocated.
    pub qty: u64,
    /// Margin required.
    pub required_margin: Money,
    /// Account capital.
    pub capital: Money,
}

/// Synchronous result of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    /// New master.
    pub master_order_id: MasterOrderId,
    /// Price used for risk and margin.
    pub effective_price: Decimal,
    /// Children created.
    pub dispatch_plan: Vec<PlannedChild>,
    /// Accounts skipped for margin.
    pub failures: Vec<MarginFailure>,
    /// Σ allocated quantity.
    pub requested_qty: u64,
    /// Σ quantity of created children.
    pub dispatched_qty: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let json = r#"{"symbol":"INFY","side":"BUY","master_qty":100}"#;
        let request: DispatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.order_type, OrderType::Market);
        assert_eq!(request.product_type, ProductType::Mis);
        assert_eq!(request.allocation_mode, AllocationMode::SameQty);
        assert!(request.lot.is_none());
        assert!(!request.allow_partial);
        assert!(request.targets.account_ids.is_empty());
    }

    #[test]
    fn request_with_custom_allocation() {
        let json = r#"{
            "symbol": "RELIANCE",
            "side": "SELL",
            "order_type": "SL",
            "price": "2500.50",
            "trigger_price": "2501",
            "product_type": "DELIVERY",
            "master_qty": 10,
            "allocation_mode": "CUSTOM_PER_ACCOUNT",
            "allocation_params": {"per_account_qty": {"acc-1": 4, "acc-2": 6}},
            "targets": {"tags": ["swing"]},
            "allow_partial": true
        }"#;
        let request: DispatchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.order_type, OrderType::StopLimit);
        assert_eq!(request.product_type, ProductType::Cnc);
        assert_eq!(
            request.allocation_params.per_account_qty[&AccountId::new("acc-2")],
            6
        );
        assert_eq!(request.targets.tags, vec!["swing".to_string()]);
    }
}
