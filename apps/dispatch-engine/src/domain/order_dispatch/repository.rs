//! Order Dispatch Repository Traits

use async_trait::async_trait;

use super::child_order::ChildOrder;
use super::fill::Fill;
use super::master_order::MasterOrder;
use crate::domain::shared::{ChildOrderId, MasterOrderId, RepositoryError};

/// Persistence for master orders. Masters are never deleted.
#[async_trait]
pub trait MasterOrderRepository: Send + Sync {
    /// Insert a new master.
    async fn insert_master(&self, master: &MasterOrder) -> Result<(), RepositoryError>;

    /// Replace an existing master.
    async fn update_master(&self, master: &MasterOrder) -> Result<(), RepositoryError>;

    /// Find a master by id.
    async fn find_master(&self, id: &MasterOrderId) -> Result<Option<MasterOrder>, RepositoryError>;

    /// Most recently created masters, newest first.
    async fn list_recent_masters(&self, limit: usize) -> Result<Vec<MasterOrder>, RepositoryError>;
}

/// Persistence for child orders.
///
/// At most one child exists per (master, account); inserting a second is a
/// [`RepositoryError::Duplicate`].
#[async_trait]
pub trait ChildOrderRepository: Send + Sync {
    /// Insert a new child.
    async fn insert_child(&self, child: &ChildOrder) -> Result<(), RepositoryError>;

    /// Replace an existing child.
    async fn update_child(&self, child: &ChildOrder) -> Result<(), RepositoryError>;

    /// Find a child by id.
    async fn find_child(&self, id: &ChildOrderId) -> Result<Option<ChildOrder>, RepositoryError>;

    /// All children of a master, in creation order.
    async fn find_children(&self, master_id: &MasterOrderId)
    -> Result<Vec<ChildOrder>, RepositoryError>;
}

/// Append-only fill journal.
#[async_trait]
pub trait FillRepository: Send + Sync {
    /// Append a fill.
    async fn append_fill(&self, fill: &Fill) -> Result<(), RepositoryError>;

    /// Fills of one child, in execution order.
    async fn find_fills_for_child(&self, child_id: &ChildOrderId)
    -> Result<Vec<Fill>, RepositoryError>;

    /// Fills across all children of a master.
    async fn find_fills_for_master(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<Vec<Fill>, RepositoryError>;
}
