//! Dependency Injection Container
//!
//! Wires ports and the shared dispatch services into use cases. The
//! services that hold process-wide state (presence, dispatch guard, task
//! registry, per-master locks) are created once here and shared by every
//! use case the container hands out.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::application::ports::{EventPublisherPort, OrderStore, QuoteSourcePort, RandomSource};
use crate::application::services::{
    ChildTaskRegistry, DispatchGuard, DispatchPlanner, ExecutionSimulator, PresenceRegistry,
    SummaryAggregator,
};
use crate::application::use_cases::{
    CancelOrdersUseCase, CreateAndDispatchUseCase, PreviewDispatchUseCase, QueryMastersUseCase,
};
use crate::config::Config;
use crate::domain::accounts::AccountRepository;
use crate::infrastructure::realtime::ConnectionHub;

/// Dependency injection container.
pub struct Container<A, S, Q, E, R>
where
    A: AccountRepository + 'static,
    S: OrderStore + 'static,
    Q: QuoteSourcePort + 'static,
    E: EventPublisherPort + 'static,
    R: RandomSource + 'static,
{
    // Ports
    accounts: Arc<A>,
    store: Arc<S>,
    publisher: Arc<E>,

    // Shared services
    presence: Arc<PresenceRegistry>,
    guard: Arc<DispatchGuard>,
    tasks: Arc<ChildTaskRegistry>,
    aggregator: Arc<SummaryAggregator<S, E>>,
    planner: Arc<DispatchPlanner<A, Q>>,
    simulator: Arc<ExecutionSimulator<S, Q, E, R>>,
}

impl<A, S, Q, E, R> Container<A, S, Q, E, R>
where
    A: AccountRepository + 'static,
    S: OrderStore + 'static,
    Q: QuoteSourcePort + 'static,
    E: EventPublisherPort + 'static,
    R: RandomSource + 'static,
{
    /// Wire everything. Cancelling `shutdown` stops every child task.
    pub fn new(
        config: &Config,
        accounts: Arc<A>,
        store: Arc<S>,
        quotes: Arc<Q>,
        publisher: Arc<E>,
        random: Arc<R>,
        shutdown: &CancellationToken,
    ) -> Self {
        let presence = Arc::new(PresenceRegistry::new(config.presence.ttl()));
        let tasks = Arc::new(ChildTaskRegistry::new(shutdown.child_token()));
        let aggregator = Arc::new(SummaryAggregator::new(
            Arc::clone(&store),
            Arc::clone(&publisher),
        ));
        let planner = Arc::new(DispatchPlanner::new(
            Arc::clone(&accounts),
            Arc::clone(&quotes),
            Arc::clone(&presence),
            config.risk.clone(),
        ));
        let simulator = Arc::new(ExecutionSimulator::new(
            Arc::clone(&store),
            quotes,
            Arc::clone(&publisher),
            random,
            Arc::clone(&aggregator),
            Arc::clone(&tasks),
            config.paper.clone(),
        ));

        Self {
            accounts,
            store,
            publisher,
            presence,
            guard: Arc::new(DispatchGuard::new()),
            tasks,
            aggregator,
            planner,
            simulator,
        }
    }

    /// Get the account repository.
    pub fn accounts(&self) -> Arc<A> {
        Arc::clone(&self.accounts)
    }

    /// Get the order store.
    pub fn store(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Get the event publisher.
    pub fn publisher(&self) -> Arc<E> {
        Arc::clone(&self.publisher)
    }

    /// Get the presence registry.
    pub fn presence(&self) -> Arc<PresenceRegistry> {
        Arc::clone(&self.presence)
    }

    /// Get the running child task registry.
    pub fn tasks(&self) -> Arc<ChildTaskRegistry> {
        Arc::clone(&self.tasks)
    }

    /// Create a `ConnectionHub` over the shared presence registry.
    pub fn connection_hub(&self) -> ConnectionHub<E> {
        ConnectionHub::new(Arc::clone(&self.presence), Arc::clone(&self.publisher))
    }

    /// Create a `PreviewDispatchUseCase`.
    pub fn preview_dispatch_use_case(&self) -> PreviewDispatchUseCase<A, Q> {
        PreviewDispatchUseCase::new(Arc::clone(&self.planner))
    }

    /// Create a `CreateAndDispatchUseCase`.
    pub fn create_and_dispatch_use_case(&self) -> CreateAndDispatchUseCase<A, S, Q, E, R> {
        CreateAndDispatchUseCase::new(
            Arc::clone(&self.planner),
            Arc::clone(&self.store),
            Arc::clone(&self.publisher),
            Arc::clone(&self.aggregator),
            Arc::clone(&self.simulator),
            Arc::clone(&self.guard),
        )
    }

    /// Create a `QueryMastersUseCase`.
    pub fn query_masters_use_case(&self) -> QueryMastersUseCase<S> {
        QueryMastersUseCase::new(Arc::clone(&self.store))
    }

    /// Create a `CancelOrdersUseCase`.
    pub fn cancel_orders_use_case(&self) -> CancelOrdersUseCase<S, E> {
        CancelOrdersUseCase::new(
            Arc::clone(&self.store),
            Arc::clone(&self.publisher),
            Arc::clone(&self.aggregator),
            Arc::clone(&self.tasks),
        )
    }
}

impl<A, S, Q, E, R> std::fmt::Debug for Container<A, S, Q, E, R>
where
    A: AccountRepository + 'static,
    S: OrderStore + 'static,
    Q: QuoteSourcePort + 'static,
    E: EventPublisherPort + 'static,
    R: RandomSource + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("presence", &self.presence)
            .field("guard", &self.guard)
            .field("tasks", &self.tasks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::DispatchRequest;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::accounts::Account;
    use crate::domain::order_dispatch::OrderSide;
    use crate::domain::shared::{ConnectionId, Money, Quote, Symbol};
    use crate::infrastructure::market_data::StaticQuoteSource;
    use crate::infrastructure::persistence::{InMemoryAccountRepository, InMemoryOrderStore};
    use crate::infrastructure::random::FixedRandom;
    use rust_decimal_macros::dec;

    type TestContainer = Container<
        InMemoryAccountRepository,
        InMemoryOrderStore,
        StaticQuoteSource,
        NoOpEventPublisher,
        FixedRandom,
    >;

    fn container() -> TestContainer {
        let quotes = Arc::new(StaticQuoteSource::new());
        quotes.set(Quote::new(Symbol::new("INFY"), dec!(99.9), dec!(100), dec!(99.95)));
        let accounts = InMemoryAccountRepository::with_accounts(vec![Account::new(
            "a",
            "Alpha",
            Money::from_units(100_000),
        )]);
        Container::new(
            &Config::default(),
            Arc::new(accounts),
            Arc::new(InMemoryOrderStore::new()),
            quotes,
            Arc::new(NoOpEventPublisher),
            Arc::new(FixedRandom::new(0.0)),
            &CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn presence_is_shared_with_the_hub() {
        let c = container();
        c.connection_hub()
            .on_connect(&"a".into(), ConnectionId::new("c-1"))
            .await;
        assert!(c.presence().is_online(&"a".into()));

        let preview = c
            .preview_dispatch_use_case()
            .execute(&DispatchRequest::market("INFY", OrderSide::Buy, 10, 10))
            .await
            .unwrap();
        assert_eq!(preview.rows.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dispatched_master_is_queryable() {
        let c = container();
        c.presence().mark_online(&"a".into(), ConnectionId::new("c-1"));

        let result = c
            .create_and_dispatch_use_case()
            .execute(&DispatchRequest::market("INFY", OrderSide::Buy, 10, 10))
            .await
            .unwrap();
        let view = c
            .query_masters_use_case()
            .get_master(&result.master_order_id)
            .await
            .unwrap();
        assert_eq!(view.children.len(), 1);
    }
}
