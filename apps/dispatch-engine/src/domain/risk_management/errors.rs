//! Risk gate violations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::shared::Money;

/// A synchronous risk-gate rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskViolation {
    /// Quantity must be positive.
    #[error("quantity must be positive, got {qty}")]
    InvalidQty {
        /// Offending quantity.
        qty: u64,
    },

    /// A priced order needs a positive price.
    #[error("price must be positive, got {price}")]
    InvalidPrice {
        /// Offending price.
        price: Decimal,
    },

    /// Notional exceeds the per-order ceiling.
    #[error("order value {value} exceeds maximum {max}")]
    MaxOrderValueExceeded {
        /// price x qty.
        value: Money,
        /// Configured ceiling.
        max: Money,
    },

    /// Limit price too far from the market.
    #[error("price is {away_pct}% away from market, maximum {max_away_pct}%")]
    PriceAwayTooMuch {
        /// Distance from reference, percent, 2 dp.
        away_pct: Decimal,
        /// Configured bound, percent.
        max_away_pct: Decimal,
    },
}

impl RiskViolation {
    /// Machine-readable reason code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidQty { .. } => "INVALID_QTY",
            Self::InvalidPrice { .. } => "INVALID_PRICE",
            Self::MaxOrderValueExceeded { .. } => "MAX_ORDER_VALUE_EXCEEDED",
            Self::PriceAwayTooMuch { .. } => "PRICE_AWAY_TOO_MUCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes() {
        assert_eq!(RiskViolation::InvalidQty { qty: 0 }.code(), "INVALID_QTY");
        assert_eq!(
            RiskViolation::PriceAwayTooMuch {
                away_pct: dec!(6),
                max_away_pct: dec!(5)
            }
            .code(),
            "PRICE_AWAY_TOO_MUCH"
        );
    }

    #[test]
    fn serializes_with_reason_tag() {
        let json = serde_json::to_value(RiskViolation::InvalidQty { qty: 0 }).unwrap();
        assert_eq!(json["reason"], "INVALID_QTY");
        assert_eq!(json["qty"], 0);
    }
}
