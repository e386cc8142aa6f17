//! Execution Simulator
//!
//! Works one child order against the simulated market as an independent
//! task: placement latency, an optional stop-trigger wait, then slices
//! priced off the live quote with random slippage and liquidity. Every
//! state change is persisted, published and folded into the master
//! summary. All timed waits race the child's cancellation token.
//!
//! Only the child's own task mutates the child.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::child_task_registry::ChildTaskRegistry;
use super::summary_aggregator::SummaryAggregator;
use crate::application::ports::{
    EventPublisherPort, OrderStore, QuoteSourcePort, RandomSource, Topic,
};
use crate::config::PaperConfig;
use crate::domain::fill_simulation::{
    execution_price, liquidity_fill, next_slice_qty, slice_count, trigger_reached,
};
use crate::domain::order_dispatch::{
    ChildOrder, ExecutionFailure, ExecutionFailureCode, Fill, OrderEvent,
};
use crate::domain::shared::BrokerOrderId;
use crate::error::DispatchError;
use crate::observability::{record_child_terminal, record_fill};

/// How a child task stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Halt {
    Reject(ExecutionFailure),
    Cancel(ExecutionFailure),
}

impl Halt {
    fn reject(code: ExecutionFailureCode, message: impl Into<String>) -> Self {
        Self::Reject(ExecutionFailure::new(code, message))
    }

    fn cancelled() -> Self {
        Self::Cancel(ExecutionFailure::new(
            ExecutionFailureCode::Cancelled,
            "cancelled by request",
        ))
    }
}

enum TriggerWait {
    Reached,
    Halted(Halt),
}

/// Paper fill simulator for child orders.
pub struct ExecutionSimulator<S, Q, E, R>
where
    S: OrderStore,
    Q: QuoteSourcePort,
    E: EventPublisherPort,
    R: RandomSource,
{
    store: Arc<S>,
    quotes: Arc<Q>,
    publisher: Arc<E>,
    random: Arc<R>,
    aggregator: Arc<SummaryAggregator<S, E>>,
    tasks: Arc<ChildTaskRegistry>,
    config: PaperConfig,
}

impl<S, Q, E, R> ExecutionSimulator<S, Q, E, R>
where
    S: OrderStore + 'static,
    Q: QuoteSourcePort + 'static,
    E: EventPublisherPort + 'static,
    R: RandomSource + 'static,
{
    /// Create a simulator.
    #[must_use]
    pub const fn new(
        store: Arc<S>,
        quotes: Arc<Q>,
        publisher: Arc<E>,
        random: Arc<R>,
        aggregator: Arc<SummaryAggregator<S, E>>,
        tasks: Arc<ChildTaskRegistry>,
        config: PaperConfig,
    ) -> Self {
        Self {
            store,
            quotes,
            publisher,
            random,
            aggregator,
            tasks,
            config,
        }
    }

    /// Registry holding the cancellation token of every running child.
    #[must_use]
    pub fn tasks(&self) -> &Arc<ChildTaskRegistry> {
        &self.tasks
    }

    /// Spawn the execution task for a child.
    pub fn launch(self: &Arc<Self>, child: ChildOrder) -> JoinHandle<Option<ChildOrder>> {
        let token = self.tasks.register(child.master_id(), child.id());
        let simulator = Arc::clone(self);
        let span = tracing::info_span!(
            "child_execution",
            child_order_id = %child.id(),
            master_order_id = %child.master_id(),
            account_id = %child.account_id(),
            symbol = %child.symbol(),
        );

        tokio::spawn(
            async move {
                let master_id = child.master_id().clone();
                let child_id = child.id().clone();
                let result = simulator.execute(child, token).await;
                simulator.tasks.complete(&master_id, &child_id);
                match result {
                    Ok(child) => Some(child),
                    Err(e) => {
                        tracing::error!(error = %e, "Child execution aborted");
                        None
                    }
                }
            }
            .instrument(span),
        )
    }

    /// Run a child to a terminal status and return it.
    pub async fn execute(
        &self,
        mut child: ChildOrder,
        token: CancellationToken,
    ) -> Result<ChildOrder, DispatchError> {
        match self.work(&mut child, &token).await? {
            None => {
                record_child_terminal(&child.status().to_string(), "none");
                tracing::info!(
                    filled_qty = child.filled_qty(),
                    avg_price = %child.avg_price(),
                    "Child order filled"
                );
                Ok(child)
            }
            Some(halt) => self.halt(child, halt).await,
        }
    }

    async fn work(
        &self,
        child: &mut ChildOrder,
        token: &CancellationToken,
    ) -> Result<Option<Halt>, DispatchError> {
        if !child.broker().is_simulated() {
            return Ok(Some(Halt::reject(
                ExecutionFailureCode::BrokerUnsupported,
                format!("{} accounts cannot be executed on the paper market", child.broker()),
            )));
        }

        let latency = self
            .random
            .jittered(self.config.placement_latency_ms, self.config.placement_jitter_ms);
        if !pause(latency, token).await {
            return Ok(Some(Halt::cancelled()));
        }
        child.place(BrokerOrderId::generate_paper())?;
        self.store.update_child(child).await?;
        self.publish_child_update(child).await;
        tracing::debug!(broker_order_id = ?child.broker_order_id(), "Child order placed");

        if child.order_type().requires_trigger()
            && let TriggerWait::Halted(halt) = self.await_trigger(child, token).await
        {
            return Ok(Some(halt));
        }

        if self.quotes.quote(child.symbol()).await.is_none() {
            return Ok(Some(Halt::reject(
                ExecutionFailureCode::UnknownSymbol,
                format!("no market for {}", child.symbol()),
            )));
        }

        let mut slices_left = slice_count(
            child.qty(),
            self.config.slice_unit_qty,
            self.config.max_slices,
        );
        let mut idle_retries = 0;

        while child.remaining_qty() > 0 {
            if token.is_cancelled() {
                return Ok(Some(Halt::cancelled()));
            }
            let Some(quote) = self.quotes.quote(child.symbol()).await else {
                return Ok(Some(Halt::reject(
                    ExecutionFailureCode::NoQuote,
                    format!("quote for {} disappeared", child.symbol()),
                )));
            };

            let slice = next_slice_qty(child.remaining_qty(), slices_left, self.random.next_f64());
            let Some(price) = execution_price(
                child.side(),
                child.order_type(),
                child.price(),
                &quote,
                self.config.max_slippage_pct,
                self.random.next_f64(),
            ) else {
                return Ok(Some(Halt::reject(
                    ExecutionFailureCode::PriceCondition,
                    format!(
                        "limit {} not crossed (bid {}, ask {})",
                        child.price().unwrap_or_default(),
                        quote.bid,
                        quote.ask
                    ),
                )));
            };

            let filled = liquidity_fill(
                slice,
                self.config.liquidity,
                self.random.next_f64(),
                self.random.next_f64(),
            );
            if filled == 0 {
                idle_retries += 1;
                if idle_retries >= self.config.max_idle_retries {
                    return Ok(Some(Halt::Cancel(ExecutionFailure::new(
                        ExecutionFailureCode::LiquidityExhausted,
                        format!("no liquidity after {idle_retries} attempts"),
                    ))));
                }
                if !pause(Duration::from_millis(self.config.liquidity_retry_ms), token).await {
                    return Ok(Some(Halt::cancelled()));
                }
                continue;
            }
            idle_retries = 0;

            let fill = child.apply_fill(filled, price)?;
            slices_left = slices_left.saturating_sub(1).max(1);
            self.record_fill(child, &fill).await?;

            if child.remaining_qty() > 0 {
                let pacing = self
                    .random
                    .jittered(self.config.slice_pacing_ms, self.config.slice_jitter_ms);
                if !pause(pacing, token).await {
                    return Ok(Some(Halt::cancelled()));
                }
            }
        }

        Ok(None)
    }

    async fn await_trigger(&self, child: &ChildOrder, token: &CancellationToken) -> TriggerWait {
        let Some(trigger) = child.trigger_price() else {
            return TriggerWait::Reached;
        };
        let deadline = Instant::now() + Duration::from_millis(self.config.trigger_timeout_ms);
        let poll = Duration::from_millis(self.config.trigger_poll_ms);

        loop {
            match self.quotes.quote(child.symbol()).await {
                None => {
                    return TriggerWait::Halted(Halt::reject(
                        ExecutionFailureCode::NoQuote,
                        format!("quote for {} disappeared while waiting for trigger", child.symbol()),
                    ));
                }
                Some(quote) if trigger_reached(child.side(), quote.last_price, trigger) => {
                    tracing::debug!(%trigger, last_price = %quote.last_price, "Stop triggered");
                    return TriggerWait::Reached;
                }
                Some(_) => {}
            }
            if Instant::now() >= deadline {
                return TriggerWait::Halted(Halt::reject(
                    ExecutionFailureCode::TriggerTimeout,
                    format!("stop {trigger} not reached within {} ms", self.config.trigger_timeout_ms),
                ));
            }
            if !pause(poll, token).await {
                return TriggerWait::Halted(Halt::cancelled());
            }
        }
    }

    async fn record_fill(&self, child: &ChildOrder, fill: &Fill) -> Result<(), DispatchError> {
        self.store.update_child(child).await?;
        self.store.append_fill(fill).await?;
        record_fill(fill.symbol.as_str(), fill.qty);
        tracing::debug!(qty = fill.qty, price = %fill.price, status = %child.status(), "Slice filled");

        self.publish_child_update(child).await;
        self.recompute_summary(child).await;

        let mut topics = vec![
            Topic::Order(fill.master_id.clone()),
            Topic::Account(fill.account_id.clone()),
        ];
        if let Some(user_id) = &fill.user_id {
            topics.push(Topic::User(user_id.clone()));
        }
        let event = OrderEvent::TradeExecuted(fill.clone());
        if let Err(e) = self.publisher.publish_order_event(&topics, &event).await {
            tracing::warn!(error = %e, "Failed to publish trade");
        }
        Ok(())
    }

    async fn halt(&self, mut child: ChildOrder, halt: Halt) -> Result<ChildOrder, DispatchError> {
        let failure = match halt {
            Halt::Reject(failure) => {
                child.reject(failure.clone())?;
                failure
            }
            Halt::Cancel(failure) => {
                child.cancel(failure.clone())?;
                failure
            }
        };
        self.store.update_child(&child).await?;
        record_child_terminal(&child.status().to_string(), failure.code.as_str());
        tracing::info!(
            status = %child.status(),
            code = %failure.code,
            filled_qty = child.filled_qty(),
            message = %failure.message,
            "Child order stopped"
        );

        self.publish_child_update(&child).await;
        self.recompute_summary(&child).await;
        Ok(child)
    }

    async fn publish_child_update(&self, child: &ChildOrder) {
        let topics = [
            Topic::Order(child.master_id().clone()),
            Topic::Account(child.account_id().clone()),
        ];
        let event = OrderEvent::ChildUpdated(child.clone());
        if let Err(e) = self.publisher.publish_order_event(&topics, &event).await {
            tracing::warn!(error = %e, "Failed to publish child update");
        }
    }

    async fn recompute_summary(&self, child: &ChildOrder) {
        if let Err(e) = self.aggregator.recompute(child.master_id()).await {
            tracing::warn!(error = %e, "Failed to recompute master summary");
        }
    }
}

impl<S, Q, E, R> std::fmt::Debug for ExecutionSimulator<S, Q, E, R>
where
    S: OrderStore,
    Q: QuoteSourcePort,
    E: EventPublisherPort,
    R: RandomSource,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionSimulator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Sleep unless cancelled first. Returns false on cancellation.
async fn pause(duration: Duration, token: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        () = token.cancelled() => false,
        () = tokio::time::sleep(duration) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NoOpEventPublisher;
    use crate::domain::accounts::Broker;
    use crate::domain::order_dispatch::{
        ChildOrderRepository, ChildStatus, FillRepository, NewChildOrder, OrderSide, OrderType,
        ProductType,
    };
    use crate::domain::shared::{AccountId, MasterOrderId, Quote, Symbol, UserId};
    use crate::infrastructure::market_data::StaticQuoteSource;
    use crate::infrastructure::persistence::InMemoryOrderStore;
    use crate::infrastructure::random::{FixedRandom, SequenceRandom};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    type Simulator<R> = ExecutionSimulator<InMemoryOrderStore, StaticQuoteSource, NoOpEventPublisher, R>;

    struct Harness<R: RandomSource> {
        store: Arc<InMemoryOrderStore>,
        quotes: Arc<StaticQuoteSource>,
        simulator: Arc<Simulator<R>>,
    }

    fn harness<R: RandomSource + 'static>(random: R, config: PaperConfig) -> Harness<R> {
        let store = Arc::new(InMemoryOrderStore::new());
        let quotes = Arc::new(StaticQuoteSource::new());
        quotes.set(Quote::new(Symbol::new("INFY"), dec!(99.9), dec!(100.1), dec!(100)));
        let publisher = Arc::new(NoOpEventPublisher);
        let aggregator = Arc::new(SummaryAggregator::new(Arc::clone(&store), Arc::clone(&publisher)));
        let simulator = Arc::new(ExecutionSimulator::new(
            Arc::clone(&store),
            Arc::clone(&quotes),
            publisher,
            Arc::new(random),
            aggregator,
            Arc::new(ChildTaskRegistry::new(CancellationToken::new())),
            config,
        ));
        Harness {
            store,
            quotes,
            simulator,
        }
    }

    async fn queued_child(
        store: &InMemoryOrderStore,
        qty: u64,
        order_type: OrderType,
        price: Option<Decimal>,
        trigger_price: Option<Decimal>,
    ) -> ChildOrder {
        let child = ChildOrder::new(NewChildOrder {
            master_id: MasterOrderId::new("m-1"),
            account_id: AccountId::new("a-1"),
            user_id: Some(UserId::new("u-1")),
            broker: Broker::Paper,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Buy,
            order_type,
            product_type: ProductType::Mis,
            qty,
            price,
            trigger_price,
        })
        .unwrap();
        store.insert_child(&child).await.unwrap();
        child
    }

    async fn assert_fills_match(store: &InMemoryOrderStore, child: &ChildOrder) {
        let fills = store.find_fills_for_child(child.id()).await.unwrap();
        assert_eq!(fills.iter().map(|f| f.qty).sum::<u64>(), child.filled_qty());
        assert!(child.filled_qty() <= child.qty());
        assert!(child.is_terminal());
    }

    #[tokio::test(start_paused = true)]
    async fn market_order_fills_completely() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        let child = queued_child(&h.store, 2500, OrderType::Market, None, None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Filled);
        assert_eq!(done.filled_qty(), 2500);
        assert_eq!(done.avg_price(), dec!(100.1));
        assert!(done.broker_order_id().is_some());
        assert_fills_match(&h.store, &done).await;
        assert_eq!(h.store.find_fills_for_child(done.id()).await.unwrap().len(), 3);
        assert_eq!(h.simulator.tasks().running(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn market_slippage_moves_price_against_buyer() {
        let h = harness(FixedRandom::new(0.6), PaperConfig::default());
        let child = queued_child(&h.store, 40, OrderType::Market, None, None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Filled);
        assert_eq!(done.filled_qty(), 40);
        // 100.1 + 100.1 x 0.25% x 0.6
        assert_eq!(done.avg_price(), dec!(100.25));
        assert_fills_match(&h.store, &done).await;
    }

    #[tokio::test(start_paused = true)]
    async fn dry_market_cancels_with_liquidity_exhausted() {
        let config = PaperConfig {
            liquidity: 0.0,
            max_idle_retries: 3,
            ..PaperConfig::default()
        };
        let h = harness(FixedRandom::new(0.0), config);
        let child = queued_child(&h.store, 10, OrderType::Market, None, None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Cancelled);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::LiquidityExhausted);
        assert_eq!(done.filled_qty(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn uncrossed_limit_is_rejected() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        let child = queued_child(&h.store, 10, OrderType::Limit, Some(dec!(99)), None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Rejected);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::PriceCondition);
        assert_fills_match(&h.store, &done).await;
    }

    #[tokio::test(start_paused = true)]
    async fn crossed_limit_fills_at_touch() {
        let h = harness(FixedRandom::new(0.5), PaperConfig::default());
        let child = queued_child(&h.store, 10, OrderType::Limit, Some(dec!(100.5)), None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Filled);
        assert_eq!(done.avg_price(), dec!(100.1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_times_out_when_never_triggered() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        let child = queued_child(&h.store, 10, OrderType::StopMarket, None, Some(dec!(120))).await;

        let started = Instant::now();
        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Rejected);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::TriggerTimeout);
        assert!(started.elapsed() >= Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_fills_once_triggered() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        let child = queued_child(&h.store, 10, OrderType::StopMarket, None, Some(dec!(101))).await;
        let handle = h.simulator.launch(child);

        tokio::time::sleep(Duration::from_secs(2)).await;
        h.quotes
            .set(Quote::new(Symbol::new("INFY"), dec!(101), dec!(101.2), dec!(101.1)));

        let done = handle.await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Filled);
        assert_eq!(done.avg_price(), dec!(101.2));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_market_is_rejected() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        h.quotes.remove(&Symbol::new("INFY"));
        let child = queued_child(&h.store, 10, OrderType::Market, None, None).await;

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Rejected);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::UnknownSymbol);
    }

    #[tokio::test(start_paused = true)]
    async fn live_broker_is_rejected() {
        let h = harness(FixedRandom::new(0.0), PaperConfig::default());
        let child = ChildOrder::new(NewChildOrder {
            master_id: MasterOrderId::new("m-1"),
            account_id: AccountId::new("a-1"),
            user_id: None,
            broker: Broker::Zerodha,
            symbol: Symbol::new("INFY"),
            side: OrderSide::Sell,
            order_type: OrderType::Market,
            product_type: ProductType::Mis,
            qty: 10,
            price: None,
            trigger_price: None,
        })
        .unwrap();
        h.store.insert_child(&child).await.unwrap();

        let done = h.simulator.launch(child).await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Rejected);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::BrokerUnsupported);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_between_slices() {
        // One slice of 700 fills at 80ms, then pacing runs until 320ms.
        let h = harness(
            SequenceRandom::new(vec![0.0, 0.0, 0.0, 0.0, 0.9, 0.5]),
            PaperConfig::default(),
        );
        let child = queued_child(&h.store, 3000, OrderType::Market, None, None).await;
        let child_id = child.id().clone();
        let handle = h.simulator.launch(child);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(h.simulator.tasks().cancel_child(&child_id));

        let done = handle.await.unwrap().unwrap();
        assert_eq!(done.status(), ChildStatus::Cancelled);
        assert_eq!(done.error().unwrap().code, ExecutionFailureCode::Cancelled);
        assert!(done.filled_qty() > 0);
        assert!(done.filled_qty() < 3000);
        assert_fills_match(&h.store, &done).await;
        let stored = h.store.find_child(&child_id).await.unwrap().unwrap();
        assert_eq!(stored.status(), ChildStatus::Cancelled);
    }
}
