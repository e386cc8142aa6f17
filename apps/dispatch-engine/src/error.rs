//! Dispatch errors and their wire representation.
//!
//! Every synchronous failure of a dispatch request maps to a stable
//! [`ErrorCode`]. The HTTP surface lives outside this crate; it serializes
//! [`ErrorResponse`] as the response body.
//!
//! | Category | Codes | HTTP |
//! |----------|-------|------|
//! | Validation | `UNKNOWN_SYMBOL`, `INVALID_PRICE`, `INVALID_TRIGGER`, `INVALID_QTY`, `INVALID_REQUEST` | 400 |
//! | Policy | `RISK_BLOCK`, `PRICE_BAND` | 422 |
//! | Targeting | `NO_MATCHING_ACCOUNTS`, `NO_ONLINE_ACCOUNTS`, `ZERO_ALLOCATION`, `NO_DISPATCHABLE_CHILDREN` | 409 |
//! | Margin | `MARGIN_FAIL` | 422 |
//! | Not found | `ORDER_NOT_FOUND` | 404 |
//! | Infrastructure | `INTERNAL_ERROR` | 500 |

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::EventPublishError;
use crate::domain::allocation::AllocationError;
use crate::domain::order_dispatch::OrderError;
use crate::domain::risk_management::RiskViolation;
use crate::domain::shared::{AccountId, MasterOrderId, Money, RepositoryError};

/// Stable error codes returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    /// No quote for the symbol.
    UnknownSymbol,
    /// Priced order without a positive price.
    InvalidPrice,
    /// Stop order without a positive trigger.
    InvalidTrigger,
    /// Master quantity is zero.
    InvalidQty,
    /// Malformed allocation mode or parameters.
    InvalidRequest,

    // Policy
    /// Basic risk check failed; the reason carries the violation.
    RiskBlock,
    /// Limit price too far from the market.
    PriceBand,

    // Targeting
    /// Selector matched no enabled account.
    NoMatchingAccounts,
    /// No matching account is online.
    NoOnlineAccounts,
    /// Allocation summed to zero.
    ZeroAllocation,
    /// Every allocated account was skipped.
    NoDispatchableChildren,

    // Margin
    /// An account lacked margin and partial dispatch was not allowed.
    MarginFail,

    // Not found
    /// Master or child order does not exist.
    OrderNotFound,

    // Infrastructure
    /// Datastore or fan-out failure.
    InternalError,
}

/// Broad class of an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Request is malformed.
    Validation,
    /// Request is well formed but violates a risk policy.
    Policy,
    /// No account can take the order.
    Targeting,
    /// Per-account margin.
    Margin,
    /// Unknown entity.
    NotFound,
    /// Datastore or fan-out failure.
    Infrastructure,
}

impl ErrorCode {
    /// Category of the code.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownSymbol
            | Self::InvalidPrice
            | Self::InvalidTrigger
            | Self::InvalidQty
            | Self::InvalidRequest => ErrorCategory::Validation,
            Self::RiskBlock | Self::PriceBand => ErrorCategory::Policy,
            Self::NoMatchingAccounts
            | Self::NoOnlineAccounts
            | Self::ZeroAllocation
            | Self::NoDispatchableChildren => ErrorCategory::Targeting,
            Self::MarginFail => ErrorCategory::Margin,
            Self::OrderNotFound => ErrorCategory::NotFound,
            Self::InternalError => ErrorCategory::Infrastructure,
        }
    }

    /// Wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownSymbol => "UNKNOWN_SYMBOL",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidTrigger => "INVALID_TRIGGER",
            Self::InvalidQty => "INVALID_QTY",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::RiskBlock => "RISK_BLOCK",
            Self::PriceBand => "PRICE_BAND",
            Self::NoMatchingAccounts => "NO_MATCHING_ACCOUNTS",
            Self::NoOnlineAccounts => "NO_ONLINE_ACCOUNTS",
            Self::ZeroAllocation => "ZERO_ALLOCATION",
            Self::NoDispatchableChildren => "NO_DISPATCHABLE_CHILDREN",
            Self::MarginFail => "MARGIN_FAIL",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl ErrorCategory {
    /// HTTP status the outer surface should answer with.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Targeting => 409,
            Self::Policy | Self::Margin => 422,
            Self::Infrastructure => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a dispatch, preview or query request.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No quote for the symbol.
    #[error("no quote available for {symbol}")]
    UnknownSymbol {
        /// Requested symbol.
        symbol: String,
    },

    /// Priced order without a positive price.
    #[error("{order_type} order requires a positive price")]
    InvalidPrice {
        /// Order type label.
        order_type: &'static str,
    },

    /// Stop order without a positive trigger.
    #[error("{order_type} order requires a positive trigger price")]
    InvalidTrigger {
        /// Order type label.
        order_type: &'static str,
    },

    /// Master quantity is zero.
    #[error("master quantity must be positive")]
    InvalidQty,

    /// Basic risk check failed.
    #[error("risk check blocked the order: {0}")]
    RiskBlock(RiskViolation),

    /// Limit price too far from the market.
    #[error("price is {away_pct}% away from market, limit {max_away_pct}%")]
    PriceBand {
        /// Distance from the reference price, in percent (2 dp).
        away_pct: Decimal,
        /// Configured bound.
        max_away_pct: Decimal,
    },

    /// Selector matched no enabled account.
    #[error("no enabled account matches the target selector")]
    NoMatchingAccounts,

    /// No matching account is online.
    #[error("none of the {candidates} matching accounts is online")]
    NoOnlineAccounts {
        /// Matching accounts before the presence filter.
        candidates: usize,
    },

    /// Allocation summed to zero.
    #[error("allocation assigned zero quantity to every account")]
    ZeroAllocation,

    /// Every allocated account was skipped.
    #[error("no child could be created for master {master_id}")]
    NoDispatchableChildren {
        /// Master marked failed.
        master_id: MasterOrderId,
    },

    /// An account lacked margin and partial dispatch was not allowed.
    #[error("insufficient margin on {account_id}: requires {required_margin}, capital {capital}")]
    MarginFail {
        /// Master marked failed.
        master_id: MasterOrderId,
        /// First failing account.
        account_id: AccountId,
        /// Margin required for the account's share.
        required_margin: Money,
        /// Account capital.
        capital: Money,
    },

    /// Unknown master or child.
    #[error("order not found: {id}")]
    OrderNotFound {
        /// Requested id.
        id: String,
    },

    /// Malformed allocation request.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Datastore failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Fan-out failure while dispatching.
    #[error(transparent)]
    Publish(#[from] EventPublishError),

    /// Aggregate rejected a state change.
    #[error(transparent)]
    Order(#[from] OrderError),
}

impl DispatchError {
    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnknownSymbol { .. } => ErrorCode::UnknownSymbol,
            Self::InvalidPrice { .. } => ErrorCode::InvalidPrice,
            Self::InvalidTrigger { .. } => ErrorCode::InvalidTrigger,
            Self::InvalidQty => ErrorCode::InvalidQty,
            Self::RiskBlock(_) => ErrorCode::RiskBlock,
            Self::PriceBand { .. } => ErrorCode::PriceBand,
            Self::NoMatchingAccounts => ErrorCode::NoMatchingAccounts,
            Self::NoOnlineAccounts { .. } => ErrorCode::NoOnlineAccounts,
            Self::ZeroAllocation => ErrorCode::ZeroAllocation,
            Self::NoDispatchableChildren { .. } => ErrorCode::NoDispatchableChildren,
            Self::MarginFail { .. } => ErrorCode::MarginFail,
            Self::OrderNotFound { .. } => ErrorCode::OrderNotFound,
            Self::Allocation(_) => ErrorCode::InvalidRequest,
            Self::Repository(_) | Self::Publish(_) | Self::Order(_) => ErrorCode::InternalError,
        }
    }

    /// Serializable response body with structured context.
    #[must_use]
    pub fn to_response(&self) -> ErrorResponse {
        let code = self.code();
        let mut details = HashMap::new();
        match self {
            Self::UnknownSymbol { symbol } => {
                details.insert("symbol".to_string(), symbol.clone());
            }
            Self::RiskBlock(violation) => {
                details.insert("reason".to_string(), violation.code().to_string());
            }
            Self::PriceBand {
                away_pct,
                max_away_pct,
            } => {
                details.insert("away_pct".to_string(), away_pct.to_string());
                details.insert("max_away_pct".to_string(), max_away_pct.to_string());
            }
            Self::NoDispatchableChildren { master_id } => {
                details.insert("master_order_id".to_string(), master_id.to_string());
            }
            Self::MarginFail {
                master_id,
                account_id,
                required_margin,
                capital,
            } => {
                details.insert("master_order_id".to_string(), master_id.to_string());
                details.insert("account_id".to_string(), account_id.to_string());
                details.insert("required_margin".to_string(), required_margin.to_string());
                details.insert("capital".to_string(), capital.to_string());
            }
            _ => {}
        }

        ErrorResponse {
            code,
            category: code.category(),
            http_status: code.category().http_status(),
            message: self.to_string(),
            details,
        }
    }
}

/// Error body handed to the outer surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable code.
    pub code: ErrorCode,
    /// Code category.
    pub category: ErrorCategory,
    /// Suggested HTTP status.
    pub http_status: u16,
    /// Human-readable message.
    pub message: String,
    /// Structured context.
    pub details: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn codes_serialize_screaming() {
        let json = serde_json::to_string(&ErrorCode::NoOnlineAccounts).unwrap();
        assert_eq!(json, "\"NO_ONLINE_ACCOUNTS\"");
        assert_eq!(ErrorCode::NoOnlineAccounts.as_str(), "NO_ONLINE_ACCOUNTS");
    }

    #[test]
    fn price_band_response_carries_distance() {
        let err = DispatchError::PriceBand {
            away_pct: dec!(6.00),
            max_away_pct: dec!(5),
        };
        let response = err.to_response();
        assert_eq!(response.code, ErrorCode::PriceBand);
        assert_eq!(response.http_status, 422);
        assert_eq!(response.details["away_pct"], "6.00");
        assert_eq!(response.details["max_away_pct"], "5");
    }

    #[test]
    fn risk_block_carries_reason() {
        let err = DispatchError::RiskBlock(RiskViolation::MaxOrderValueExceeded {
            value: Money::from_units(300_000),
            max: Money::from_units(200_000),
        });
        let response = err.to_response();
        assert_eq!(response.code, ErrorCode::RiskBlock);
        assert_eq!(response.details["reason"], "MAX_ORDER_VALUE_EXCEEDED");
    }

    #[test]
    fn margin_fail_names_account() {
        let err = DispatchError::MarginFail {
            master_id: MasterOrderId::new("m-1"),
            account_id: AccountId::new("acc-2"),
            required_margin: Money::from_units(200),
            capital: Money::from_units(150),
        };
        let response = err.to_response();
        assert_eq!(response.category, ErrorCategory::Margin);
        assert_eq!(response.details["account_id"], "acc-2");
        assert_eq!(response.details["required_margin"], "200.00");
    }

    #[test]
    fn infrastructure_errors_are_internal() {
        let err = DispatchError::from(RepositoryError::Unavailable {
            message: "down".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::InternalError);
        assert_eq!(err.to_response().http_status, 500);
    }

    #[test]
    fn targeting_errors_map_to_conflict() {
        assert_eq!(
            DispatchError::NoOnlineAccounts { candidates: 2 }.to_response().http_status,
            409
        );
        assert_eq!(DispatchError::ZeroAllocation.code().category(), ErrorCategory::Targeting);
    }
}
