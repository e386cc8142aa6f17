//! Allocation engine.
//!
//! Pure function from (mode, parameters, candidates, master quantity) to a
//! per-account quantity. Rounding always truncates toward zero and the
//! remainder is dropped, so the total may be below the master quantity.
//! The master quantity is also a hard ceiling: raw quantities that would
//! over-allocate are trimmed in candidate order.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use super::errors::AllocationError;
use super::mode::{AllocationMode, AllocationParams};
use crate::domain::accounts::Account;
use crate::domain::shared::{AccountId, Money};

/// One account's share of a master order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationEntry {
    /// Target account.
    pub account_id: AccountId,
    /// Allocated quantity (may be 0).
    pub qty: u64,
}

/// Result of an allocation, in candidate order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    entries: Vec<AllocationEntry>,
}

impl Allocation {
    /// Entries in candidate order.
    #[must_use]
    pub fn entries(&self) -> &[AllocationEntry] {
        &self.entries
    }

    /// Quantity allocated to an account (0 if absent).
    #[must_use]
    pub fn qty_for(&self, account_id: &AccountId) -> u64 {
        self.entries
            .iter()
            .find(|e| &e.account_id == account_id)
            .map_or(0, |e| e.qty)
    }

    /// Sum of all allocated quantities.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.qty).sum()
    }

    /// Returns true if nothing was allocated.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Split `master_qty` across `accounts` under the given mode.
///
/// `capital_by_account` overrides an account's own capital for the
/// `PROPORTIONAL` mode; accounts missing from it use [`Account::capital`].
pub fn allocate(
    mode: AllocationMode,
    params: &AllocationParams,
    accounts: &[Account],
    master_qty: u64,
    capital_by_account: &HashMap<AccountId, Money>,
) -> Result<Allocation, AllocationError> {
    let raw: Vec<u64> = match mode {
        AllocationMode::SameQty => vec![params.same_qty; accounts.len()],
        AllocationMode::CustomPerAccount => accounts
            .iter()
            .map(|a| params.per_account_qty.get(&a.id).copied().unwrap_or(0))
            .collect(),
        AllocationMode::PctOfMaster => {
            if params.percent < Decimal::ZERO {
                return Err(AllocationError::InvalidParameter {
                    field: "percent",
                    message: format!("must not be negative, got {}", params.percent),
                });
            }
            let each = floor_qty(Decimal::from(master_qty) * params.percent / Decimal::ONE_HUNDRED);
            vec![each; accounts.len()]
        }
        AllocationMode::Proportional => proportional(accounts, master_qty, capital_by_account),
    };

    let mut budget = master_qty;
    let entries = accounts
        .iter()
        .zip(raw)
        .map(|(account, qty)| {
            let granted = qty.min(budget);
            budget -= granted;
            AllocationEntry {
                account_id: account.id.clone(),
                qty: granted,
            }
        })
        .collect();

    Ok(Allocation { entries })
}

fn proportional(
    accounts: &[Account],
    master_qty: u64,
    capital_by_account: &HashMap<AccountId, Money>,
) -> Vec<u64> {
    let capitals: Vec<Decimal> = accounts
        .iter()
        .map(|a| {
            capital_by_account
                .get(&a.id)
                .copied()
                .unwrap_or(a.capital)
                .amount()
                .max(Decimal::ZERO)
        })
        .collect();
    let total: Decimal = capitals.iter().copied().sum();
    if total.is_zero() {
        return vec![0; accounts.len()];
    }
    let master = Decimal::from(master_qty);
    capitals
        .into_iter()
        .map(|capital| floor_qty(master * capital / total))
        .collect()
}

fn floor_qty(value: Decimal) -> u64 {
    value.floor().to_u64().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn accounts(capitals: &[i64]) -> Vec<Account> {
        capitals
            .iter()
            .enumerate()
            .map(|(i, c)| Account::new(format!("a{i}"), format!("Account {i}"), Money::from_units(*c)))
            .collect()
    }

    fn qtys(allocation: &Allocation) -> Vec<u64> {
        allocation.entries().iter().map(|e| e.qty).collect()
    }

    // =========================================================================
    // Per-mode behaviour
    // =========================================================================

    #[test]
    fn same_qty_gives_every_candidate_the_same() {
        let accts = accounts(&[1, 2, 3]);
        let alloc = allocate(
            AllocationMode::SameQty,
            &AllocationParams::same_qty(10),
            &accts,
            30,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![10, 10, 10]);
    }

    #[test]
    fn same_qty_zero_is_allowed() {
        let accts = accounts(&[1, 2]);
        let alloc = allocate(
            AllocationMode::SameQty,
            &AllocationParams::same_qty(0),
            &accts,
            10,
            &HashMap::new(),
        )
        .unwrap();
        assert!(alloc.is_zero());
    }

    #[test]
    fn same_qty_trimmed_to_master_in_candidate_order() {
        let accts = accounts(&[1, 2, 3]);
        let alloc = allocate(
            AllocationMode::SameQty,
            &AllocationParams::same_qty(40),
            &accts,
            100,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![40, 40, 20]);
    }

    #[test]
    fn custom_defaults_missing_accounts_to_zero() {
        let accts = accounts(&[1, 2, 3]);
        let params = AllocationParams::per_account([("a0", 7), ("a2", 3)]);
        let alloc = allocate(
            AllocationMode::CustomPerAccount,
            &params,
            &accts,
            100,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![7, 0, 3]);
        assert_eq!(alloc.qty_for(&AccountId::new("a2")), 3);
    }

    #[test]
    fn pct_of_master_truncates() {
        let accts = accounts(&[1, 2]);
        let alloc = allocate(
            AllocationMode::PctOfMaster,
            &AllocationParams::percent(dec!(33)),
            &accts,
            10,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![3, 3]);
    }

    #[test]
    fn pct_of_master_rejects_negative_percent() {
        let accts = accounts(&[1]);
        let err = allocate(
            AllocationMode::PctOfMaster,
            &AllocationParams::percent(dec!(-5)),
            &accts,
            10,
            &HashMap::new(),
        )
        .unwrap_err();
        assert!(matches!(err, AllocationError::InvalidParameter { field: "percent", .. }));
    }

    #[test]
    fn proportional_by_capital() {
        let accts = accounts(&[100, 300]);
        let alloc = allocate(
            AllocationMode::Proportional,
            &AllocationParams::default(),
            &accts,
            40,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![10, 30]);
    }

    #[test]
    fn proportional_drops_rounding_remainder() {
        let accts = accounts(&[1, 1, 1]);
        let alloc = allocate(
            AllocationMode::Proportional,
            &AllocationParams::default(),
            &accts,
            10,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![3, 3, 3]);
        assert_eq!(alloc.total(), 9);
    }

    #[test]
    fn proportional_zero_capital_allocates_nothing() {
        let accts = accounts(&[0, 0]);
        let alloc = allocate(
            AllocationMode::Proportional,
            &AllocationParams::default(),
            &accts,
            50,
            &HashMap::new(),
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![0, 0]);
    }

    #[test]
    fn proportional_uses_capital_override() {
        let accts = accounts(&[100, 100]);
        let overrides = HashMap::from([(AccountId::new("a1"), Money::from_units(300))]);
        let alloc = allocate(
            AllocationMode::Proportional,
            &AllocationParams::default(),
            &accts,
            40,
            &overrides,
        )
        .unwrap();
        assert_eq!(qtys(&alloc), vec![10, 30]);
    }

    #[test]
    fn no_candidates_yields_empty_allocation() {
        let alloc = allocate(
            AllocationMode::SameQty,
            &AllocationParams::same_qty(5),
            &[],
            10,
            &HashMap::new(),
        )
        .unwrap();
        assert!(alloc.entries().is_empty());
        assert!(alloc.is_zero());
    }

    // =========================================================================
    // Properties
    // =========================================================================

    fn mode_strategy() -> impl Strategy<Value = AllocationMode> {
        prop_oneof![
            Just(AllocationMode::SameQty),
            Just(AllocationMode::CustomPerAccount),
            Just(AllocationMode::PctOfMaster),
            Just(AllocationMode::Proportional),
        ]
    }

    proptest! {
        #[test]
        fn never_over_allocates(
            mode in mode_strategy(),
            capitals in prop::collection::vec(0i64..1_000_000, 0..12),
            master_qty in 0u64..100_000,
            same_qty in 0u64..50_000,
            percent in 0u32..300,
            custom in prop::collection::vec(0u64..50_000, 12),
        ) {
            let accts = accounts(&capitals);
            let params = AllocationParams {
                same_qty,
                percent: Decimal::from(percent),
                per_account_qty: accts
                    .iter()
                    .zip(custom)
                    .map(|(a, q)| (a.id.clone(), q))
                    .collect(),
            };
            let alloc = allocate(mode, &params, &accts, master_qty, &HashMap::new()).unwrap();
            prop_assert!(alloc.total() <= master_qty);
            prop_assert_eq!(alloc.entries().len(), accts.len());
        }

        #[test]
        fn proportional_is_weighted_floor(
            capitals in prop::collection::vec(1i64..1_000_000, 1..10),
            master_qty in 0u64..100_000,
        ) {
            let accts = accounts(&capitals);
            let alloc = allocate(
                AllocationMode::Proportional,
                &AllocationParams::default(),
                &accts,
                master_qty,
                &HashMap::new(),
            ).unwrap();
            let total: i64 = capitals.iter().sum();
            for (entry, capital) in alloc.entries().iter().zip(&capitals) {
                let expected = (u128::from(master_qty) * (*capital as u128)) / (total as u128);
                prop_assert_eq!(u128::from(entry.qty), expected);
            }
        }
    }
}
