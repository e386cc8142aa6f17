//! Risk gate configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Synchronous risk limits applied to every master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Ceiling on price x master quantity.
    #[serde(default = "default_max_order_value")]
    pub max_order_value: Decimal,
    /// Maximum distance of a limit price from the market, in percent.
    #[serde(default = "default_max_away_pct")]
    pub max_away_pct: Decimal,
    /// Lot size when the request does not supply one.
    #[serde(default = "default_lot")]
    pub default_lot: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_order_value: default_max_order_value(),
            max_away_pct: default_max_away_pct(),
            default_lot: default_lot(),
        }
    }
}

fn default_max_order_value() -> Decimal {
    Decimal::from(200_000)
}

fn default_max_away_pct() -> Decimal {
    Decimal::from(5)
}

const fn default_lot() -> u32 {
    1
}
