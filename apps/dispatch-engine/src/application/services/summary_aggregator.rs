//! Master Summary Aggregator
//!
//! Recomputes a master's filled quantity, VWAP and final status from its
//! children. Recomputation is serialized per master through a keyed async
//! mutex so there is a single writer per master at any time.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::application::ports::{EventPublisherPort, OrderStore, Topic};
use crate::domain::order_dispatch::{
    ChildOrder, ChildProgress, MasterOrder, MasterSummaryChanged, OrderEvent, PlannedChild,
    fill_totals,
};
use crate::domain::shared::{MasterOrderId, Timestamp};
use crate::error::DispatchError;

/// Build an `order.master.summary` event for a master.
#[must_use]
pub fn summary_event(
    master: &MasterOrder,
    plan: Vec<PlannedChild>,
    children: &[ChildOrder],
) -> OrderEvent {
    OrderEvent::MasterSummary(MasterSummaryChanged {
        master_id: master.id().clone(),
        status: master.status(),
        summary: *master.summary(),
        plan,
        children: children
            .iter()
            .map(|c| ChildProgress {
                child_id: c.id().clone(),
                account_id: c.account_id().clone(),
                status: c.status(),
                filled_qty: c.filled_qty(),
            })
            .collect(),
        at: Timestamp::now(),
    })
}

/// Single-writer recomputation of master summaries.
pub struct SummaryAggregator<S, E>
where
    S: OrderStore,
    E: EventPublisherPort,
{
    store: Arc<S>,
    publisher: Arc<E>,
    locks: Mutex<HashMap<MasterOrderId, Arc<AsyncMutex<()>>>>,
}

impl<S, E> SummaryAggregator<S, E>
where
    S: OrderStore,
    E: EventPublisherPort,
{
    /// Create a new aggregator.
    #[must_use]
    pub fn new(store: Arc<S>, publisher: Arc<E>) -> Self {
        Self {
            store,
            publisher,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take the write lock of a master.
    ///
    /// Any other writer of the master's status or summary must hold it.
    pub async fn acquire(&self, master_id: &MasterOrderId) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.locks.lock().entry(master_id.clone()).or_default());
        lock.lock_owned().await
    }

    /// Recompute and persist a master's summary, then emit it.
    ///
    /// Returns `None` for an unknown master.
    pub async fn recompute(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<Option<MasterOrder>, DispatchError> {
        let guard = self.acquire(master_id).await;
        let result = self.recompute_locked(master_id).await;
        drop(guard);

        if let Ok(Some((master, settled))) = &result
            && master.status().is_terminal()
            && *settled
        {
            self.locks.lock().remove(master_id);
        }
        result.map(|r| r.map(|(master, _)| master))
    }

    /// Recompute while the caller already holds [`acquire`](Self::acquire).
    ///
    /// The flag is true once every child is terminal.
    pub async fn recompute_locked(
        &self,
        master_id: &MasterOrderId,
    ) -> Result<Option<(MasterOrder, bool)>, DispatchError> {
        let Some(mut master) = self.store.find_master(master_id).await? else {
            return Ok(None);
        };
        let children = self.store.find_children(master_id).await?;
        let totals = fill_totals(&children);

        master.apply_fill_summary(totals.filled_qty, totals.avg_price);
        if totals.all_terminal {
            master.settle(totals.all_filled)?;
        }
        self.store.update_master(&master).await?;

        tracing::debug!(
            master_order_id = %master_id,
            status = %master.status(),
            filled_qty = totals.filled_qty,
            avg_price = %totals.avg_price,
            "Master summary recomputed"
        );

        let event = summary_event(&master, Vec::new(), &children);
        if let Err(e) = self
            .publisher
            .publish_order_event(&[Topic::Order(master_id.clone())], &event)
            .await
        {
            tracing::warn!(master_order_id = %master_id, error = %e, "Failed to publish master summary");
        }

        Ok(Some((master, totals.all_terminal)))
    }

    /// Number of masters with a live lock entry.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

impl<S, E> std::fmt::Debug for SummaryAggregator<S, E>
where
    S: OrderStore,
    E: EventPublisherPort,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryAggregator")
            .field("tracked", &self.tracked())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::accounts::{Broker, TargetSelector};
    use crate::domain::allocation::{AllocationMode, AllocationParams};
    use crate::domain::order_dispatch::{
        ChildOrderRepository, CreateMasterCommand, ExecutionFailure, ExecutionFailureCode,
        MasterOrderRepository, MasterStatus, NewChildOrder, OrderSide, OrderType, ProductType,
        Validity,
    };
    use crate::domain::shared::{AccountId, BrokerOrderId, Symbol};
    use crate::infrastructure::persistence::InMemoryOrderStore;
    use rust_decimal_macros::dec;

    type Aggregator = SummaryAggregator<InMemoryOrderStore, NoOpEventPublisher>;

    fn setup() -> (Arc<InMemoryOrderStore>, Aggregator) {
        let store = Arc::new(InMemoryOrderStore::new());
        let aggregator = SummaryAggregator::new(Arc::clone(&store), Arc::new(NoOpEventPublisher));
        (store, aggregator)
    }

    async fn dispatching_master(store: &InMemoryOrderStore) -> MasterOrder {
        let mut master = MasterOrder::new(CreateMasterCommand {
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
            master_qty: 100,
            allocation_mode: AllocationMode::SameQty,
            allocation_params: AllocationParams::same_qty(50),
            targets: TargetSelector::all(),
            allow_partial: false,
        });
        master.begin_dispatch(100).unwrap();
        master.record_dispatched(100, 2);
        store.insert_master(&master).await.unwrap();
        master
    }

    async fn placed_child(store: &InMemoryOrderStore, master: &MasterOrder, account: &str) -> ChildOrder {
        let mut child = ChildOrder::new(NewChildOrder {
            master_id: master.id().clone(),
            account_id: AccountId::new(account),
            user_id: None,
            broker: Broker::Paper,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            product_type: ProductType::Mis,
            qty: 50,
            price: None,
            trigger_price: None,
        })
        .unwrap();
        child.place(BrokerOrderId::new("PB-1")).unwrap();
        store.insert_child(&child).await.unwrap();
        child
    }

    #[tokio::test]
    async fn all_filled_children_settle_master_filled() {
        let (store, aggregator) = setup();
        let master = dispatching_master(&store).await;
        let mut a = placed_child(&store, &master, "a").await;
        let mut b = placed_child(&store, &master, "b").await;
        a.apply_fill(50, dec!(100)).unwrap();
        b.apply_fill(50, dec!(102)).unwrap();
        store.update_child(&a).await.unwrap();
        store.update_child(&b).await.unwrap();

        let master = aggregator.recompute(master.id()).await.unwrap().unwrap();
        assert_eq!(master.status(), MasterStatus::Filled);
        assert_eq!(master.summary().filled_qty, 100);
        assert_eq!(master.summary().avg_price, dec!(101));
        assert_eq!(aggregator.tracked(), 0);
    }

    #[tokio::test]
    async fn mixed_outcome_is_partial() {
        let (store, aggregator) = setup();
        let master = dispatching_master(&store).await;
        let mut a = placed_child(&store, &master, "a").await;
        let mut b = placed_child(&store, &master, "b").await;
        a.apply_fill(50, dec!(100)).unwrap();
        b.reject(ExecutionFailure::new(ExecutionFailureCode::NoQuote, "gone"))
            .unwrap();
        store.update_child(&a).await.unwrap();
        store.update_child(&b).await.unwrap();

        let master = aggregator.recompute(master.id()).await.unwrap().unwrap();
        assert_eq!(master.status(), MasterStatus::Partial);
        assert_eq!(master.summary().filled_qty, 50);
    }

    #[tokio::test]
    async fn running_children_keep_master_dispatching() {
        let (store, aggregator) = setup();
        let master = dispatching_master(&store).await;
        let mut a = placed_child(&store, &master, "a").await;
        placed_child(&store, &master, "b").await;
        a.apply_fill(20, dec!(99.5)).unwrap();
        store.update_child(&a).await.unwrap();

        let master = aggregator.recompute(master.id()).await.unwrap().unwrap();
        assert_eq!(master.status(), MasterStatus::Dispatching);
        assert_eq!(master.summary().filled_qty, 20);
        assert_eq!(master.summary().avg_price, dec!(99.5));
        assert_eq!(aggregator.tracked(), 1);
    }

    #[tokio::test]
    async fn cancelled_master_is_preserved() {
        let (store, aggregator) = setup();
        let mut master = dispatching_master(&store).await;
        let mut a = placed_child(&store, &master, "a").await;
        a.apply_fill(50, dec!(100)).unwrap();
        store.update_child(&a).await.unwrap();
        master.cancel("operator").unwrap();
        store.update_master(&master).await.unwrap();

        let master = aggregator.recompute(master.id()).await.unwrap().unwrap();
        assert_eq!(master.status(), MasterStatus::Cancelled);
        assert_eq!(master.summary().filled_qty, 50);
    }

    #[tokio::test]
    async fn unknown_master_is_none() {
        let (_, aggregator) = setup();
        let result = aggregator.recompute(&MasterOrderId::new("missing")).await.unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn summary_event_lists_child_progress() {
        let master = MasterOrder::new(CreateMasterCommand {
            user_id: None,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Sell,
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
        });
        let OrderEvent::MasterSummary(event) = summary_event(&master, Vec::new(), &[]) else {
            panic!("expected summary event");
        };
        assert_eq!(&event.master_id, master.id());
        assert!(event.children.is_empty());
    }
}
