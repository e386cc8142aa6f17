//! Target selector for resolving candidate accounts of a master order.

use serde::{Deserialize, Serialize};

use super::account::{Account, Broker};
use crate::domain::shared::{AccountId, UserId};

/// Filter applied to linked accounts when fanning out a master order.
///
/// Every present criterion must match; empty lists match everything.
/// Disabled accounts never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSelector {
    /// Restrict to accounts owned by this user.
    #[serde(default)]
    pub user_id: Option<UserId>,
    /// Restrict to these account ids.
    #[serde(default)]
    pub account_ids: Vec<AccountId>,
    /// Restrict to accounts carrying at least one of these tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Restrict to accounts on one of these brokers.
    #[serde(default)]
    pub brokers: Vec<Broker>,
}

impl TargetSelector {
    /// Selector matching every enabled account.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Selector for an explicit list of account ids.
    #[must_use]
    pub fn accounts<I, A>(ids: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AccountId>,
    {
        Self {
            account_ids: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Returns true if the account is eligible under this selector.
    #[must_use]
    pub fn matches(&self, account: &Account) -> bool {
        if !account.enabled {
            return false;
        }
        if let Some(user_id) = &self.user_id {
            if account.user_id.as_ref() != Some(user_id) {
                return false;
            }
        }
        if !self.account_ids.is_empty() && !self.account_ids.contains(&account.id) {
            return false;
        }
        if !self.tags.is_empty() && !account.tags.iter().any(|t| self.tags.contains(t)) {
            return false;
        }
        if !self.brokers.is_empty() && !self.brokers.contains(&account.broker) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::shared::Money;

    fn account(id: &str) -> Account {
        Account::new(id, id.to_uppercase(), Money::from_units(100_000))
    }

    #[test]
    fn empty_selector_matches_enabled_only() {
        let selector = TargetSelector::all();
        assert!(selector.matches(&account("a1")));
        assert!(!selector.matches(&account("a2").disabled()));
    }

    #[test]
    fn user_filter() {
        let selector = TargetSelector {
            user_id: Some(UserId::new("u1")),
            ..TargetSelector::default()
        };
        assert!(selector.matches(&account("a1").with_user("u1")));
        assert!(!selector.matches(&account("a1").with_user("u2")));
        assert!(!selector.matches(&account("a1")));
    }

    #[test]
    fn id_filter() {
        let selector = TargetSelector::accounts(["a1", "a3"]);
        assert!(selector.matches(&account("a1")));
        assert!(!selector.matches(&account("a2")));
    }

    #[test]
    fn tag_filter_matches_any() {
        let selector = TargetSelector {
            tags: vec!["core".to_string(), "hedge".to_string()],
            ..TargetSelector::default()
        };
        assert!(selector.matches(&account("a1").with_tags(["hedge"])));
        assert!(!selector.matches(&account("a1").with_tags(["swing"])));
    }

    #[test]
    fn broker_filter() {
        let selector = TargetSelector {
            brokers: vec![Broker::Zerodha],
            ..TargetSelector::default()
        };
        assert!(selector.matches(&account("a1").with_broker(Broker::Zerodha)));
        assert!(!selector.matches(&account("a1")));
    }

    #[test]
    fn deserializes_uppercase_brokers() {
        let json = r#"{"brokers":["PAPER","ANGEL"]}"#;
        let selector: TargetSelector = serde_json::from_str(json).unwrap();
        assert_eq!(selector.brokers, vec![Broker::Paper, Broker::Angel]);
    }
}
