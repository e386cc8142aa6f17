//! Random-Walk Quote Source
//!
//! Simulated market for paper trading. Each tick drifts every symbol's mid
//! by `(draw - 0.5) x volatility`, never below the floor price. Quotes are
//! built around the current mid with a fixed spread and rounded to 2 dp.
//!
//! The ticker task can be paused and resumed without losing prices, and
//! optionally broadcasts every quote as a `tick` on `symbol:<SYM>`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::{Decimal, RoundingStrategy};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::application::ports::{
    EventEnvelope, EventPublisherPort, QuoteSourcePort, RandomSource, Topic,
};
use crate::config::SimulatorConfig;
use crate::domain::shared::{Quote, Symbol};

/// Slowest allowed speed multiplier.
pub const MIN_SPEED: f64 = 0.1;

/// Event name of a broadcast quote.
pub const TICK_EVENT: &str = "tick";

#[derive(Debug)]
struct WalkState {
    running: bool,
    speed: f64,
    mids: BTreeMap<Symbol, Decimal>,
}

/// Quote source backed by a bounded random walk per symbol.
pub struct RandomWalkQuoteSource<R: RandomSource> {
    random: Arc<R>,
    spread: Decimal,
    volatility: Decimal,
    floor_price: Decimal,
    tick_interval: Duration,
    state: RwLock<WalkState>,
}

impl<R: RandomSource> RandomWalkQuoteSource<R> {
    /// Build from configuration. The source starts paused unless
    /// `autostart` is set.
    #[must_use]
    pub fn new(config: &SimulatorConfig, random: Arc<R>) -> Self {
        let mids = config
            .symbols
            .iter()
            .map(|s| (Symbol::new(&s.symbol), s.start_price.max(config.floor_price)))
            .collect();
        Self {
            random,
            spread: config.spread,
            volatility: config.volatility,
            floor_price: config.floor_price,
            tick_interval: Duration::from_millis(config.tick_interval_ms),
            state: RwLock::new(WalkState {
                running: config.autostart,
                speed: config.speed.max(MIN_SPEED),
                mids,
            }),
        }
    }

    /// Resume ticking.
    pub fn start(&self) {
        self.state.write().running = true;
        tracing::info!("Market simulator started");
    }

    /// Stop ticking; prices hold at their last value.
    pub fn pause(&self) {
        self.state.write().running = false;
        tracing::info!("Market simulator paused");
    }

    /// Whether the walk advances on each tick.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.read().running
    }

    /// Set the tick rate multiplier, clamped to [`MIN_SPEED`].
    pub fn set_speed(&self, speed: f64) {
        let speed = if speed.is_finite() { speed.max(MIN_SPEED) } else { MIN_SPEED };
        self.state.write().speed = speed;
        tracing::debug!(speed, "Market simulator speed changed");
    }

    /// Current speed multiplier.
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.state.read().speed
    }

    /// Replace the simulated universe.
    ///
    /// Symbols already simulated keep their current mid; new ones start at
    /// the given price.
    pub fn set_symbols(&self, symbols: impl IntoIterator<Item = (Symbol, Decimal)>) {
        let mut state = self.state.write();
        let mids = symbols
            .into_iter()
            .map(|(symbol, start)| {
                let mid = state
                    .mids
                    .get(&symbol)
                    .copied()
                    .unwrap_or_else(|| start.max(self.floor_price));
                (symbol, mid)
            })
            .collect();
        state.mids = mids;
    }

    /// Simulated symbols in name order.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.state.read().mids.keys().cloned().collect()
    }

    /// Delay between ticks at the current speed.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval.div_f64(self.speed())
    }

    /// Advance every symbol by one step.
    pub fn step(&self) {
        let mut state = self.state.write();
        for mid in state.mids.values_mut() {
            let draw = Decimal::try_from(self.random.next_f64().clamp(0.0, 1.0))
                .unwrap_or(Decimal::new(5, 1));
            let moved = *mid + (draw - Decimal::new(5, 1)) * self.volatility;
            *mid = moved.max(self.floor_price);
        }
    }

    /// Quotes for every simulated symbol.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Quote> {
        self.state
            .read()
            .mids
            .iter()
            .map(|(symbol, mid)| self.quote_at(symbol.clone(), *mid))
            .collect()
    }

    fn quote_at(&self, symbol: Symbol, mid: Decimal) -> Quote {
        let half = self.spread / Decimal::TWO;
        let round = |v: Decimal| v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Quote::new(symbol, round(mid - half), round(mid + half), round(mid))
    }
}

impl<R: RandomSource + 'static> RandomWalkQuoteSource<R> {
    /// Spawn the ticker. Each tick advances the walk while running and,
    /// when a publisher is given, broadcasts the resulting quotes.
    pub fn spawn_ticker<E>(
        self: &Arc<Self>,
        publisher: Option<Arc<E>>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()>
    where
        E: EventPublisherPort + 'static,
    {
        let source = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(source.tick_interval()) => {}
                }
                if !source.is_running() {
                    continue;
                }
                source.step();
                if let Some(publisher) = &publisher {
                    source.broadcast(publisher.as_ref()).await;
                }
            }
            tracing::debug!("Market simulator ticker stopped");
        })
    }

    async fn broadcast<E: EventPublisherPort>(&self, publisher: &E) {
        for quote in self.snapshot() {
            let payload = match serde_json::to_value(&quote) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode tick");
                    continue;
                }
            };
            let envelope = EventEnvelope::new(Topic::Symbol(quote.symbol.clone()), TICK_EVENT, payload);
            if let Err(e) = publisher.publish(envelope).await {
                tracing::warn!(symbol = %quote.symbol, error = %e, "Failed to publish tick");
            }
        }
    }
}

#[async_trait]
impl<R: RandomSource> QuoteSourcePort for RandomWalkQuoteSource<R> {
    async fn quote(&self, symbol: &Symbol) -> Option<Quote> {
        let mid = self.state.read().mids.get(symbol).copied()?;
        Some(self.quote_at(symbol.clone(), mid))
    }
}

impl<R: RandomSource> std::fmt::Debug for RandomWalkQuoteSource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomWalkQuoteSource")
            .field("tick_interval", &self.tick_interval)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}
