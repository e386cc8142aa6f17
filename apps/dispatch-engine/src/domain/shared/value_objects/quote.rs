//! Top-of-book quote.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Symbol, Timestamp};

/// Market quote data: best bid/ask and last traded price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Best bid price.
    pub bid: Decimal,
    /// Best ask price.
    pub ask: Decimal,
    /// Last traded price.
    pub last_price: Decimal,
    /// Quote timestamp.
    pub timestamp: Timestamp,
}

impl Quote {
    /// Create a new quote stamped now.
    #[must_use]
    pub fn new(symbol: Symbol, bid: Decimal, ask: Decimal, last_price: Decimal) -> Self {
        Self {
            symbol,
            bid,
            ask,
            last_price,
            timestamp: Timestamp::now(),
        }
    }

    /// Get the mid price.
    #[must_use]
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// Get the spread.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        self.ask - self.bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn mid_and_spread() {
        let quote = Quote::new(Symbol::new("INFY"), dec!(99.85), dec!(100.15), dec!(100));
        assert_eq!(quote.mid(), dec!(100.00));
        assert_eq!(quote.spread(), dec!(0.30));
    }
}
