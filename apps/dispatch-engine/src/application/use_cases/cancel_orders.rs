//! Cancel Orders Use Case

use std::sync::Arc;

use crate::application::dto::{CancelMasterResult, CancelOutcome};
use crate::application::ports::{EventPublisherPort, OrderStore, Topic};
use crate::application::services::{ChildTaskRegistry, SummaryAggregator};
use crate::domain::order_dispatch::{ChildOrder, ExecutionFailure, ExecutionFailureCode, OrderEvent};
use crate::domain::shared::{ChildOrderId, MasterOrderId};
use crate::error::DispatchError;
use crate::observability::record_child_terminal;

/// Use case for cancelling child orders and whole masters.
pub struct CancelOrdersUseCase<S, E>
where
    S: OrderStore,
    E: EventPublisherPort,
{
    store: Arc<S>,
    publisher: Arc<E>,
    aggregator: Arc<SummaryAggregator<S, E>>,
    tasks: Arc<ChildTaskRegistry>,
}

impl<S, E> CancelOrdersUseCase<S, E>
where
    S: OrderStore,
    E: EventPublisherPort,
{
    /// Create a new `CancelOrdersUseCase`.
    pub const fn new(
        store: Arc<S>,
        publisher: Arc<E>,
        aggregator: Arc<SummaryAggregator<S, E>>,
        tasks: Arc<ChildTaskRegistry>,
    ) -> Self {
        Self {
            store,
            publisher,
            aggregator,
            tasks,
        }
    }

    /// Cancel one child order.
    ///
    /// A running child is signalled and its own task records the
    /// cancellation; a child without a task is cancelled here.
    pub async fn cancel_child(&self, child_id: &ChildOrderId) -> Result<CancelOutcome, DispatchError> {
        // 1. Load child
        let child = self
            .store
            .find_child(child_id)
            .await?
            .ok_or_else(|| DispatchError::OrderNotFound {
                id: child_id.to_string(),
            })?;

        // 2. Terminal children stay as they are
        if child.is_terminal() {
            return Ok(CancelOutcome::AlreadyTerminal);
        }

        // 3. Signal the running task, or cancel directly
        if self.tasks.cancel_child(child_id) {
            tracing::info!(child_order_id = %child_id, "Child cancellation signalled");
        } else {
            let master_id = child.master_id().clone();
            self.cancel_orphan(child).await?;
            self.recompute(&master_id).await;
        }
        Ok(CancelOutcome::Cancelled)
    }

    /// Cancel a master and every non-terminal child.
    pub async fn cancel_master(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<CancelMasterResult, DispatchError> {
        // 1. Mark the master cancelled under its write lock
        let guard = self.aggregator.acquire(master_id).await;
        let mut master = self
            .store
            .find_master(master_id)
            .await?
            .ok_or_else(|| DispatchError::OrderNotFound {
                id: master_id.to_string(),
            })?;
        if master.status().is_terminal() {
            return Ok(CancelMasterResult {
                outcome: CancelOutcome::AlreadyTerminal,
                cancelled_children: 0,
            });
        }
        master.cancel("cancelled by request")?;
        self.store.update_master(&master).await?;
        drop(guard);

        // 2. Signal running children
        let mut cancelled = self.tasks.cancel_master(master_id);

        // 3. Cancel children with no running task
        for child in self.store.find_children(master_id).await? {
            if !child.is_terminal() && !self.tasks.is_running(child.id()) {
                self.cancel_orphan(child).await?;
                cancelled += 1;
            }
        }

        // 4. Publish the cancelled summary
        self.recompute(master_id).await;

        tracing::info!(master_order_id = %master_id, cancelled_children = cancelled, "Master cancelled");
        Ok(CancelMasterResult {
            outcome: CancelOutcome::Cancelled,
            cancelled_children: cancelled,
        })
    }

    async fn cancel_orphan(&self, mut child: ChildOrder) -> Result<(), DispatchError> {
        child.cancel(ExecutionFailure::new(
            ExecutionFailureCode::Cancelled,
            "cancelled by request",
        ))?;
        self.store.update_child(&child).await?;
        record_child_terminal(&child.status().to_string(), ExecutionFailureCode::Cancelled.as_str());

        let topics = [
            Topic::Order(child.master_id().clone()),
            Topic::Account(child.account_id().clone()),
        ];
        if let Err(e) = self
            .publisher
            .publish_order_event(&topics, &OrderEvent::ChildUpdated(child))
            .await
        {
            tracing::warn!(error = %e, "Failed to publish child cancellation");
        }
        Ok(())
    }

    async fn recompute(&self, master_id: &MasterOrderId) {
        if let Err(e) = self.aggregator.recompute(master_id).await {
            tracing::warn!(master_order_id = %master_id, error = %e, "Failed to recompute master summary");
        }
    }
}
