//! Fill Simulation
//!
//! Pure execution math for the paper market: slice sizing, execution
//! price, liquidity draw and stop trigger. Randomness is passed in as
//! uniform draws in `[0, 1)` so every function is deterministic.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::domain::order_dispatch::value_objects::{OrderSide, OrderType};
use crate::domain::shared::Quote;

/// Number of slices a child is worked in.
///
/// `max(1, min(max_slices, ceil(qty / slice_unit_qty)))`.
#[must_use]
pub fn slice_count(qty: u64, slice_unit_qty: u64, max_slices: u32) -> u32 {
    let unit = slice_unit_qty.max(1);
    let wanted = qty.div_ceil(unit);
    let capped = wanted.min(u64::from(max_slices));
    u32::try_from(capped).unwrap_or(max_slices).max(1)
}

/// Size of the next slice.
///
/// A randomized 0.7x..1.3x share of `remaining / slices_left`, at least 1
/// and at most `remaining`. The final slice takes the whole remainder.
#[must_use]
pub fn next_slice_qty(remaining: u64, slices_left: u32, draw: f64) -> u64 {
    if remaining == 0 {
        return 0;
    }
    if slices_left <= 1 {
        return remaining;
    }
    let base = Decimal::from(remaining) / Decimal::from(slices_left);
    let factor = dec!(0.7) + dec!(0.6) * unit_draw(draw);
    let sized = (base * factor).floor().to_u64().unwrap_or(1);
    sized.clamp(1, remaining)
}

fn unit_draw(draw: f64) -> Decimal {
    Decimal::try_from(draw.clamp(0.0, 1.0)).unwrap_or(Decimal::ZERO)
}

/// Execution price for one slice, or `None` when a limit is not crossed.
///
/// Market-style orders take the opposing best price moved against the
/// taker by `draw x max_slippage_pct` percent. Limit-style orders fill at
/// the touch only once it has crossed the limit.
#[must_use]
pub fn execution_price(
    side: OrderSide,
    order_type: OrderType,
    limit: Option<Decimal>,
    quote: &Quote,
    max_slippage_pct: Decimal,
    draw: f64,
) -> Option<Decimal> {
    let touch = match side {
        OrderSide::Buy => quote.ask,
        OrderSide::Sell => quote.bid,
    };

    if order_type.is_market_style() {
        let slip = touch * max_slippage_pct / Decimal::ONE_HUNDRED * unit_draw(draw);
        let price = match side {
            OrderSide::Buy => touch + slip,
            OrderSide::Sell => touch - slip,
        };
        return Some(price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero));
    }

    let limit = limit?;
    let crossed = match side {
        OrderSide::Buy => quote.ask <= limit,
        OrderSide::Sell => quote.bid >= limit,
    };
    crossed.then_some(touch)
}

/// Quantity the market absorbs out of a slice.
///
/// With probability `liquidity` (first draw) the whole slice; otherwise a
/// `second_draw` fraction of it, which may be zero.
#[must_use]
pub fn liquidity_fill(slice_qty: u64, liquidity: f64, first_draw: f64, second_draw: f64) -> u64 {
    if first_draw < liquidity {
        return slice_qty;
    }
    ((slice_qty as f64) * second_draw.clamp(0.0, 1.0)).floor() as u64
}

/// Stop trigger condition: BUY when last >= trigger, SELL when last <= trigger.
#[must_use]
pub fn trigger_reached(side: OrderSide, last_price: Decimal, trigger: Decimal) -> bool {
    match side {
        OrderSide::Buy => last_price >= trigger,
        OrderSide::Sell => last_price <= trigger,
    }
}
