//! In-memory repositories.
//!
//! Read-after-write consistent and process-local. Suitable for tests,
//! development and the paper-trading binary.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::domain::accounts::{Account, AccountRepository, TargetSelector};
use crate::domain::order_dispatch::{
    ChildOrder, ChildOrderRepository, Fill, FillRepository, MasterOrder, MasterOrderRepository,
};
use crate::domain::shared::{AccountId, ChildOrderId, MasterOrderId, RepositoryError};

/// In-memory implementation of `AccountRepository`.
///
/// Accounts are returned sorted by id so candidate order is stable.
#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<BTreeMap<AccountId, Account>>,
}

impl InMemoryAccountRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository seeded with accounts.
    #[must_use]
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts.into_iter().map(|a| (a.id.clone(), a)).collect()),
        }
    }

    /// Number of stored accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Check if the repository is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_matching(&self, selector: &TargetSelector) -> Result<Vec<Account>, RepositoryError> {
        Ok(self
            .accounts
            .read()
            .values()
            .filter(|a| selector.matches(a))
            .cloned()
            .collect())
    }

    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError> {
        Ok(self.accounts.read().get(id).cloned())
    }

    async fn upsert_account(&self, account: &Account) -> Result<(), RepositoryError> {
        self.accounts
            .write()
            .insert(account.id.clone(), account.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct OrderTables {
    masters: HashMap<MasterOrderId, MasterOrder>,
    master_sequence: Vec<MasterOrderId>,
    children: HashMap<ChildOrderId, ChildOrder>,
    children_by_master: HashMap<MasterOrderId, Vec<ChildOrderId>>,
    child_keys: HashSet<(MasterOrderId, AccountId)>,
    fills: Vec<Fill>,
}

/// In-memory order store: masters, children and fills.
///
/// Rejects a second child for the same (master, account) pair.
#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    tables: RwLock<OrderTables>,
}

impl InMemoryOrderStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored masters.
    #[must_use]
    pub fn master_count(&self) -> usize {
        self.tables.read().masters.len()
    }

    /// Number of stored fills.
    #[must_use]
    pub fn fill_count(&self) -> usize {
        self.tables.read().fills.len()
    }
}

#[async_trait]
impl MasterOrderRepository for InMemoryOrderStore {
    async fn insert_master(&self, master: &MasterOrder) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        if tables.masters.contains_key(master.id()) {
            return Err(RepositoryError::Duplicate {
                entity: "master order",
                id: master.id().to_string(),
            });
        }
        tables.masters.insert(master.id().clone(), master.clone());
        tables.master_sequence.push(master.id().clone());
        Ok(())
    }

    async fn update_master(&self, master: &MasterOrder) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        let Some(slot) = tables.masters.get_mut(master.id()) else {
            return Err(RepositoryError::Missing {
                entity: "master order",
                id: master.id().to_string(),
            });
        };
        *slot = master.clone();
        Ok(())
    }

    async fn find_master(&self, id: &MasterOrderId) -> Result<Option<MasterOrder>, RepositoryError> {
        Ok(self.tables.read().masters.get(id).cloned())
    }

    async fn list_recent_masters(&self, limit: usize) -> Result<Vec<MasterOrder>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .master_sequence
            .iter()
            .rev()
            .filter_map(|id| tables.masters.get(id))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChildOrderRepository for InMemoryOrderStore {
    async fn insert_child(&self, child: &ChildOrder) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        let key = (child.master_id().clone(), child.account_id().clone());
        if tables.children.contains_key(child.id()) || tables.child_keys.contains(&key) {
            return Err(RepositoryError::Duplicate {
                entity: "child order",
                id: child.id().to_string(),
            });
        }
        tables.child_keys.insert(key);
        tables
            .children_by_master
            .entry(child.master_id().clone())
            .or_default()
            .push(child.id().clone());
        tables.children.insert(child.id().clone(), child.clone());
        Ok(())
    }

    async fn update_child(&self, child: &ChildOrder) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write();
        let Some(slot) = tables.children.get_mut(child.id()) else {
            return Err(RepositoryError::Missing {
                entity: "child order",
                id: child.id().to_string(),
            });
        };
        *slot = child.clone();
        Ok(())
    }

    async fn find_child(&self, id: &ChildOrderId) -> Result<Option<ChildOrder>, RepositoryError> {
        Ok(self.tables.read().children.get(id).cloned())
    }

    async fn find_children(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<Vec<ChildOrder>, RepositoryError> {
        let tables = self.tables.read();
        Ok(tables
            .children_by_master
            .get(master_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| tables.children.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl FillRepository for InMemoryOrderStore {
    async fn append_fill(&self, fill: &Fill) -> Result<(), RepositoryError> {
        self.tables.write().fills.push(fill.clone());
        Ok(())
    }

    async fn find_fills_for_child(
        &self,
        child_id: &ChildOrderId,
    ) -> Result<Vec<Fill>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .fills
            .iter()
            .filter(|f| &f.child_id == child_id)
            .cloned()
            .collect())
    }

    async fn find_fills_for_master(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<Vec<Fill>, RepositoryError> {
        Ok(self
            .tables
            .read()
            .fills
            .iter()
            .filter(|f| &f.master_id == master_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::Broker;
    use crate::domain::allocation::{AllocationMode, AllocationParams};
    use crate::domain::order_dispatch::{
        CreateMasterCommand, NewChildOrder, OrderSide, OrderType, ProductType, Validity,
    };
    use crate::domain::shared::{BrokerOrderId, Money, Symbol};
    use rust_decimal_macros::dec;

    fn master() -> MasterOrder {
        MasterOrder::new(CreateMasterCommand {
            user_id: None,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            price: None,
            trigger_price: None,
            effective_price: dec!(100),
            product_type: ProductType::Mis,
            validity: Validity::Day,
            lot: 1,
            master_qty: 10,
            allocation_mode: AllocationMode::SameQty,
            allocation_params: AllocationParams::same_qty(10),
            targets: TargetSelector::all(),
            allow_partial: false,
        })
    }

    fn child(master: &MasterOrder, account: &str) -> ChildOrder {
        ChildOrder::new(NewChildOrder {
            master_id: master.id().clone(),
            account_id: AccountId::new(account),
            user_id: None,
            broker: Broker::Paper,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            product_type: ProductType::Mis,
            qty: 10,
            price: None,
            trigger_price: None,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn accounts_match_selector_in_id_order() {
        let repo = InMemoryAccountRepository::with_accounts(vec![
            Account::new("c", "C", Money::from_units(1)).with_tags(["swing"]),
            Account::new("a", "A", Money::from_units(1)).with_tags(["swing"]),
            Account::new("b", "B", Money::from_units(1)).disabled(),
        ]);
        let all = repo.find_matching(&TargetSelector::all()).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(repo.len(), 3);

        repo.upsert_account(&Account::new("b", "B", Money::from_units(1)))
            .await
            .unwrap();
        assert_eq!(repo.find_matching(&TargetSelector::all()).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn duplicate_master_is_rejected() {
        let store = InMemoryOrderStore::new();
        let m = master();
        store.insert_master(&m).await.unwrap();
        let err = store.insert_master(&m).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn second_child_for_same_account_is_rejected() {
        let store = InMemoryOrderStore::new();
        let m = master();
        store.insert_child(&child(&m, "a")).await.unwrap();
        let err = store.insert_child(&child(&m, "a")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Duplicate { entity: "child order", .. }));
        store.insert_child(&child(&m, "b")).await.unwrap();
        assert_eq!(store.find_children(m.id()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_missing() {
        let store = InMemoryOrderStore::new();
        let m = master();
        assert!(matches!(
            store.update_master(&m).await.unwrap_err(),
            RepositoryError::Missing { .. }
        ));
        assert!(matches!(
            store.update_child(&child(&m, "a")).await.unwrap_err(),
            RepositoryError::Missing { .. }
        ));
    }

    #[tokio::test]
    async fn fills_are_indexed_by_child_and_master() {
        let store = InMemoryOrderStore::new();
        let m = master();
        let mut c = child(&m, "a");
        store.insert_child(&c).await.unwrap();
        c.place(BrokerOrderId::new("PB-1")).unwrap();
        let fill = c.apply_fill(4, dec!(100)).unwrap();
        store.append_fill(&fill).await.unwrap();

        assert_eq!(store.find_fills_for_child(c.id()).await.unwrap().len(), 1);
        assert_eq!(store.find_fills_for_master(m.id()).await.unwrap()[0].qty, 4);
        assert_eq!(store.fill_count(), 1);
    }
}
