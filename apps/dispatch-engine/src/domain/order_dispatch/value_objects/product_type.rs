//! Product type, which determines the margin fraction.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Holding product of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// Intraday (margin intraday square-off).
    #[serde(alias = "INTRADAY")]
    Mis,
    /// Carry-forward derivatives/normal.
    #[serde(alias = "CARRYFORWARD")]
    Nrml,
    /// Cash-and-carry delivery.
    #[serde(alias = "DELIVERY")]
    Cnc,
}

impl ProductType {
    /// Fraction of notional that must be covered by capital.
    #[must_use]
    pub fn margin_fraction(&self) -> Decimal {
        match self {
            Self::Mis => dec!(0.2),
            Self::Nrml => dec!(0.5),
            Self::Cnc => Decimal::ONE,
        }
    }
}

impl Default for ProductType {
    fn default() -> Self {
        Self::Mis
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mis => write!(f, "MIS"),
            Self::Nrml => write!(f, "NRML"),
            Self::Cnc => write!(f, "CNC"),
        }
    }
}

/// How long an order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Validity {
    /// Good for the trading day.
    #[default]
    Day,
    /// Immediate or cancel.
    Ioc,
}
