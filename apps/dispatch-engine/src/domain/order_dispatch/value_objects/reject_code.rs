//! Execution-time failure codes recorded on a child order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a child order stopped short of FILLED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionFailureCode {
    /// Stop trigger never reached within the timeout.
    TriggerTimeout,
    /// No quote for the symbol when execution started.
    UnknownSymbol,
    /// Quote disappeared mid-execution.
    NoQuote,
    /// Limit price not crossed by the market.
    PriceCondition,
    /// No execution adapter for the account's broker.
    BrokerUnsupported,
    /// Slice budget exhausted with quantity still open.
    LiquidityExhausted,
    /// Cancelled on request.
    Cancelled,
}

impl ExecutionFailureCode {
    /// Wire code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TriggerTimeout => "TRIGGER_TIMEOUT",
            Self::UnknownSymbol => "UNKNOWN_SYMBOL",
            Self::NoQuote => "NO_QUOTE",
            Self::PriceCondition => "PRICE_CONDITION",
            Self::BrokerUnsupported => "BROKER_UNSUPPORTED",
            Self::LiquidityExhausted => "LIQUIDITY_EXHAUSTED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for ExecutionFailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error recorded on a rejected or cancelled child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// Machine-readable code.
    pub code: ExecutionFailureCode,
    /// Human-readable detail.
    pub message: String,
}

impl ExecutionFailure {
    /// Create a failure record.
    pub fn new(code: ExecutionFailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_screaming_snake() {
        let failure = ExecutionFailure::new(ExecutionFailureCode::TriggerTimeout, "Stop not reached");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["code"], "TRIGGER_TIMEOUT");
        assert_eq!(failure.to_string(), "TRIGGER_TIMEOUT: Stop not reached");
    }
}
