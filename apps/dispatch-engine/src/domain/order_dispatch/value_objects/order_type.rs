//! Order type (market, limit, stop-limit, stop-market).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order type as understood by Indian retail brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    /// Execute at the best available price.
    #[serde(rename = "MARKET")]
    Market,
    /// Execute only at the limit price or better.
    #[serde(rename = "LIMIT")]
    Limit,
    /// Stop-loss limit: becomes a limit order once the trigger is reached.
    #[serde(rename = "SL")]
    StopLimit,
    /// Stop-loss market: becomes a market order once the trigger is reached.
    #[serde(rename = "SL-M")]
    StopMarket,
}

impl OrderType {
    /// Returns true if the order needs a limit price.
    #[must_use]
    pub const fn requires_price(&self) -> bool {
        matches!(self, Self::Limit | Self::StopLimit)
    }

    /// Returns true if the order waits for a trigger price.
    #[must_use]
    pub const fn requires_trigger(&self) -> bool {
        matches!(self, Self::StopLimit | Self::StopMarket)
    }

    /// Returns true if the order executes at the market once live.
    #[must_use]
    pub const fn is_market_style(&self) -> bool {
        matches!(self, Self::Market | Self::StopMarket)
    }

    /// Wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "MARKET",
            Self::Limit => "LIMIT",
            Self::StopLimit => "SL",
            Self::StopMarket => "SL-M",
        }
    }
}

impl Default for OrderType {
    fn default() -> Self {
        Self::Market
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
