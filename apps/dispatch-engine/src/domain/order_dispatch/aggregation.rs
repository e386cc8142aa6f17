//! Fill aggregation across a master's children.

use rust_decimal::{Decimal, RoundingStrategy};

use super::child_order::ChildOrder;
use super::value_objects::ChildStatus;

/// Totals derived from a master's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTotals {
    /// Σ filled quantity.
    pub filled_qty: u64,
    /// VWAP over filled quantity, 2 dp; zero when nothing filled.
    pub avg_price: Decimal,
    /// Every child is terminal (false when there are no children).
    pub all_terminal: bool,
    /// Every child is `FILLED` (false when there are no children).
    pub all_filled: bool,
}

/// Aggregate children into master-level totals.
#[must_use]
pub fn fill_totals(children: &[ChildOrder]) -> FillTotals {
    let filled_qty: u64 = children.iter().map(ChildOrder::filled_qty).sum();
    let notional: Decimal = children
        .iter()
        .map(|c| c.avg_price() * Decimal::from(c.filled_qty()))
        .sum();
    let avg_price = if filled_qty == 0 {
        Decimal::ZERO
    } else {
        (notional / Decimal::from(filled_qty))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    };

    FillTotals {
        filled_qty,
        avg_price,
        all_terminal: !children.is_empty() && children.iter().all(ChildOrder::is_terminal),
        all_filled: !children.is_empty()
            && children.iter().all(|c| c.status() == ChildStatus::Filled),
    }
}
