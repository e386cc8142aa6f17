//! Allocation modes and their parameters.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::AllocationError;
use crate::domain::shared::AccountId;

/// Policy that splits a master quantity across candidate accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationMode {
    /// Every candidate receives the same fixed quantity.
    SameQty,
    /// Each candidate receives an explicitly configured quantity.
    CustomPerAccount,
    /// Every candidate receives a percentage of the master quantity.
    PctOfMaster,
    /// Master quantity weighted by each candidate's capital.
    Proportional,
}

impl AllocationMode {
    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SameQty => "SAME_QTY",
            Self::CustomPerAccount => "CUSTOM_PER_ACCOUNT",
            Self::PctOfMaster => "PCT_OF_MASTER",
            Self::Proportional => "PROPORTIONAL",
        }
    }
}

impl Default for AllocationMode {
    fn default() -> Self {
        Self::SameQty
    }
}

impl fmt::Display for AllocationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AllocationMode {
    type Err = AllocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SAME_QTY" => Ok(Self::SameQty),
            "CUSTOM_PER_ACCOUNT" => Ok(Self::CustomPerAccount),
            "PCT_OF_MASTER" => Ok(Self::PctOfMaster),
            "PROPORTIONAL" => Ok(Self::Proportional),
            other => Err(AllocationError::UnknownMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// Mode-specific allocation parameters.
///
/// Only the field relevant to the chosen mode is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationParams {
    /// Quantity per account for `SAME_QTY`.
    #[serde(default)]
    pub same_qty: u64,
    /// Percentage of master quantity for `PCT_OF_MASTER`.
    #[serde(default)]
    pub percent: Decimal,
    /// Explicit quantities for `CUSTOM_PER_ACCOUNT`. Absent accounts get 0.
    #[serde(default)]
    pub per_account_qty: HashMap<AccountId, u64>,
}

impl AllocationParams {
    /// Parameters for `SAME_QTY`.
    #[must_use]
    pub fn same_qty(qty: u64) -> Self {
        Self {
            same_qty: qty,
            ..Self::default()
        }
    }

    /// Parameters for `PCT_OF_MASTER`.
    #[must_use]
    pub fn percent(percent: Decimal) -> Self {
        Self {
            percent,
            ..Self::default()
        }
    }

    /// Parameters for `CUSTOM_PER_ACCOUNT`.
    #[must_use]
    pub fn per_account<I, A>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, u64)>,
        A: Into<AccountId>,
    {
        Self {
            per_account_qty: entries.into_iter().map(|(a, q)| (a.into(), q)).collect(),
            ..Self::default()
        }
    }
}
