//! Linked trading account and broker label.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::shared::{AccountId, DomainError, Money, UserId};

/// Broker a linked account routes through.
///
/// Only [`Broker::Paper`] has an execution adapter; the others exist so that
/// accounts can be targeted by broker and are rejected at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broker {
    /// In-process paper broker backed by the execution simulator.
    Paper,
    /// Zerodha Kite.
    Zerodha,
    /// Fyers.
    Fyers,
    /// Angel One.
    Angel,
}

impl Broker {
    /// Uppercase wire label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Paper => "PAPER",
            Self::Zerodha => "ZERODHA",
            Self::Fyers => "FYERS",
            Self::Angel => "ANGEL",
        }
    }

    /// Returns true if orders for this broker can be executed in-process.
    #[must_use]
    pub const fn is_simulated(&self) -> bool {
        matches!(self, Self::Paper)
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::Paper
    }
}

impl fmt::Display for Broker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Broker {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PAPER" => Ok(Self::Paper),
            "ZERODHA" => Ok(Self::Zerodha),
            "FYERS" => Ok(Self::Fyers),
            "ANGEL" => Ok(Self::Angel),
            other => Err(DomainError::invalid("broker", format!("unknown broker '{other}'"))),
        }
    }
}

/// A trading account linked to a user. Read-only to the dispatch core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Owning user, when the account belongs to one.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Human-readable name.
    pub display_name: String,
    /// Capital available for margin.
    pub capital: Money,
    /// Disabled accounts are never targeted.
    pub enabled: bool,
    /// Broker the account routes through.
    #[serde(default)]
    pub broker: Broker,
    /// Free-form grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Account {
    /// Create an enabled paper account with no tags.
    pub fn new(id: impl Into<AccountId>, display_name: impl Into<String>, capital: Money) -> Self {
        Self {
            id: id.into(),
            user_id: None,
            display_name: display_name.into(),
            capital,
            enabled: true,
            broker: Broker::Paper,
            tags: Vec::new(),
        }
    }

    /// Builder: set the owning user.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<UserId>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Builder: set the broker.
    #[must_use]
    pub const fn with_broker(mut self, broker: Broker) -> Self {
        self.broker = broker;
        self
    }

    /// Builder: set tags.
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: mark the account disabled.
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}
