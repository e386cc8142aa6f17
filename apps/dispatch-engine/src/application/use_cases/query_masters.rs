//! Query Masters Use Case
//!
//! Read model over masters. The summary returned by [`QueryMastersUseCase::get_master`]
//! is recomputed from the children so it is never behind the fills.

use std::sync::Arc;

use crate::application::dto::MasterView;
use crate::application::ports::OrderStore;
use crate::domain::order_dispatch::{MasterOrder, fill_totals};
use crate::domain::shared::MasterOrderId;
use crate::error::DispatchError;

/// Default page size of [`QueryMastersUseCase::list_recent`].
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// Use case for reading masters and their children.
pub struct QueryMastersUseCase<S>
where
    S: OrderStore,
{
    store: Arc<S>,
}

impl<S> QueryMastersUseCase<S>
where
    S: OrderStore,
{
    /// Create a new `QueryMastersUseCase`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load a master with its children.
    pub async fn get_master(&self, id: &MasterOrderId) -> Result<MasterView, DispatchError> {
        let mut master = self
            .store
            .find_master(id)
            .await?
            .ok_or_else(|| DispatchError::OrderNotFound {
                id: id.to_string(),
            })?;
        let children = self.store.find_children(id).await?;

        let totals = fill_totals(&children);
        master.apply_fill_summary(totals.filled_qty, totals.avg_price);

        Ok(MasterView { master, children })
    }

    /// Most recent masters, newest first.
    pub async fn list_recent(&self, limit: Option<usize>) -> Result<Vec<MasterOrder>, DispatchError> {
        let limit = limit.unwrap_or(DEFAULT_RECENT_LIMIT);
        Ok(self.store.list_recent_masters(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accounts::{Broker, TargetSelector};
    use crate::domain::allocation::{AllocationMode, AllocationParams};
    use crate::domain::order_dispatch::{
        ChildOrder, ChildOrderRepository, CreateMasterCommand, MasterOrderRepository,
        NewChildOrder, OrderSide, OrderType, ProductType, Validity,
    };
    use crate::domain::shared::{AccountId, BrokerOrderId, Symbol};
    use crate::error::ErrorCode;
    use crate::infrastructure::persistence::InMemoryOrderStore;
    use rust_decimal_macros::dec;

    fn master(qty: u64) -> MasterOrder {
        MasterOrder::new(CreateMasterCommand {
            user_id: None,
            symbol: Symbol::new("RELIANCE"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            price: None,
            trigger_price: None,
            effective_price: dec!(2500),
            product_type: ProductType::Mis,
            validity: Validity::Day,
            lot: 1,
            master_qty: qty,
            allocation_mode: AllocationMode::SameQty,
            allocation_params: AllocationParams::same_qty(qty),
            targets: TargetSelector::all(),
            allow_partial: false,
        })
    }

    #[tokio::test]
    async fn get_master_recomputes_from_children() {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut m = master(10);
        m.begin_dispatch(10).unwrap();
        store.insert_master(&m).await.unwrap();

        let mut child = ChildOrder::new(NewChildOrder {
            master_id: m.id().clone(),
            account_id: AccountId::new("a"),
            user_id: None,
            broker: Broker::Paper,
            symbol: Symbol::new("RELIANCE"),
            side: OrderSide::Buy,
            order_type: OrderType::Market,
            product_type: ProductType::Mis,
            qty: 10,
            price: None,
            trigger_price: None,
        })
        .unwrap();
        child.place(BrokerOrderId::new("PB-1")).unwrap();
        child.apply_fill(4, dec!(2501)).unwrap();
        store.insert_child(&child).await.unwrap();

        let use_case = QueryMastersUseCase::new(store);
        let view = use_case.get_master(m.id()).await.unwrap();
        assert_eq!(view.children.len(), 1);
        assert_eq!(view.master.summary().filled_qty, 4);
        assert_eq!(view.master.summary().avg_price, dec!(2501));
    }

    #[tokio::test]
    async fn missing_master_is_not_found() {
        let use_case = QueryMastersUseCase::new(Arc::new(InMemoryOrderStore::new()));
        let err = use_case
            .get_master(&MasterOrderId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first_and_limited() {
        let store = Arc::new(InMemoryOrderStore::new());
        let mut ids = Vec::new();
        for qty in 1..=3 {
            let m = master(qty);
            ids.push(m.id().clone());
            store.insert_master(&m).await.unwrap();
        }
        let use_case = QueryMastersUseCase::new(store);

        let recent = use_case.list_recent(Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id(), &ids[2]);
        assert_eq!(recent[1].id(), &ids[1]);
        assert_eq!(use_case.list_recent(None).await.unwrap().len(), 3);
    }
}
