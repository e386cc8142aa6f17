//! Order sanity and price band checks.

use rust_decimal::Decimal;

use super::errors::RiskViolation;
use crate::domain::order_dispatch::value_objects::{OrderSide, OrderType};
use crate::domain::shared::{Money, Quote};

/// Basic price/quantity sanity check.
///
/// Checks, in order: positive quantity, positive price when `require_price`,
/// and `price x qty <= max_order_value`.
pub fn basic_risk_check(
    price: Decimal,
    qty: u64,
    require_price: bool,
    max_order_value: Money,
) -> Result<(), RiskViolation> {
    if qty == 0 {
        return Err(RiskViolation::InvalidQty { qty });
    }
    if require_price && price <= Decimal::ZERO {
        return Err(RiskViolation::InvalidPrice { price });
    }
    let value = Money::new(price * Decimal::from(qty));
    if value > max_order_value {
        return Err(RiskViolation::MaxOrderValueExceeded {
            value,
            max: max_order_value,
        });
    }
    Ok(())
}

/// Limit-price distance check against the touch.
///
/// Market-style orders always pass. Otherwise the reference is the ask for
/// BUY and the bid for SELL; the order fails when
/// `|price - ref| / ref * 100 > max_away_pct`. A non-positive reference
/// cannot be measured against and passes.
pub fn price_band_check(
    side: OrderSide,
    order_type: OrderType,
    price: Decimal,
    quote: &Quote,
    max_away_pct: Decimal,
) -> Result<(), RiskViolation> {
    if order_type.is_market_style() {
        return Ok(());
    }
    let reference = match side {
        OrderSide::Buy => quote.ask,
        OrderSide::Sell => quote.bid,
    };
    if reference <= Decimal::ZERO {
        return Ok(());
    }
    let away_pct = (price - reference).abs() / reference * Decimal::ONE_HUNDRED;
    if away_pct > max_away_pct {
        return Err(RiskViolation::PriceAwayTooMuch {
            away_pct: away_pct.round_dp(2),
            max_away_pct,
        });
    }
    Ok(())
}
