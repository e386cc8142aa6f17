//! Account Repository Trait

use async_trait::async_trait;

use super::account::Account;
use super::target_selector::TargetSelector;
use crate::domain::shared::{AccountId, RepositoryError};

/// Read access to linked accounts.
///
/// Accounts are managed outside the dispatch core; `upsert` exists for
/// seeding and administration.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find every account matching the selector, in a stable order.
    async fn find_matching(
        &self,
        selector: &TargetSelector,
    ) -> Result<Vec<Account>, RepositoryError>;

    /// Find an account by id.
    async fn find_account(&self, id: &AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Insert or replace an account.
    async fn upsert_account(&self, account: &Account) -> Result<(), RepositoryError>;
}
