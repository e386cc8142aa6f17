//! Dispatch Engine Binary
//!
//! Runs the paper-trading dispatch engine: a random-walk market, the
//! presence sweeper and the in-process fan-out channel.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin dispatch-engine -- --demo
//! ```
//!
//! # Environment Variables
//!
//! - `DISPATCH_CONFIG`: Config file path (default: config.yaml)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`
//!
//! With `--demo` the engine seeds three accounts, brings two of them
//! online and dispatches one master order so the whole pipeline can be
//! watched in the logs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use dispatch_engine::application::dto::DispatchRequest;
use dispatch_engine::config::{Config, ConfigError, load_config};
use dispatch_engine::domain::accounts::Account;
use dispatch_engine::domain::order_dispatch::OrderSide;
use dispatch_engine::domain::shared::{ConnectionId, Money};
use dispatch_engine::infrastructure::config::Container;
use dispatch_engine::infrastructure::market_data::RandomWalkQuoteSource;
use dispatch_engine::infrastructure::persistence::{InMemoryAccountRepository, InMemoryOrderStore};
use dispatch_engine::infrastructure::random::SeededRandom;
use dispatch_engine::infrastructure::realtime::BroadcastEventPublisher;
use dispatch_engine::observability::{init_metrics, init_tracing};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

type EngineContainer = Container<
    InMemoryAccountRepository,
    InMemoryOrderStore,
    RandomWalkQuoteSource<SeededRandom>,
    BroadcastEventPublisher,
    SeededRandom,
>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config_path = std::env::var("DISPATCH_CONFIG").ok();
    let config = match load_config(config_path.as_deref()) {
        Ok(config) => config,
        // No explicit path and no config.yaml: run on defaults.
        Err(ConfigError::ReadError { .. }) if config_path.is_none() => Config::default(),
        Err(e) => return Err(e).context("failed to load configuration"),
    };

    init_tracing(&config.observability.logging).context("failed to initialize tracing")?;
    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics).context("failed to start metrics exporter")?;
    }

    tracing::info!(
        presence_ttl_ms = config.presence.ttl_ms,
        liquidity = config.paper.liquidity,
        symbols = config.simulator.symbols.len(),
        "Starting dispatch engine"
    );

    let shutdown = CancellationToken::new();
    let publisher = Arc::new(BroadcastEventPublisher::new(config.fanout.capacity));
    let market = Arc::new(RandomWalkQuoteSource::new(
        &config.simulator,
        Arc::new(SeededRandom::new(config.simulator.seed)),
    ));
    let execution_random = Arc::new(SeededRandom::new(
        config.simulator.seed.map(|s| s.wrapping_add(1)),
    ));

    let container: EngineContainer = Container::new(
        &config,
        Arc::new(InMemoryAccountRepository::new()),
        Arc::new(InMemoryOrderStore::new()),
        Arc::clone(&market),
        Arc::clone(&publisher),
        execution_random,
        &shutdown,
    );

    let mut handles = vec![
        market.spawn_ticker(Some(Arc::clone(&publisher)), shutdown.clone()),
        container
            .presence()
            .spawn_sweeper(config.presence.sweep_interval(), shutdown.clone()),
        spawn_event_logger(&publisher, shutdown.clone()),
    ];

    if std::env::args().any(|a| a == "--demo") {
        handles.push(spawn_demo(&container, shutdown.clone()).await?);
    }

    tracing::info!("Dispatch engine ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();

    let drain = futures::future::join_all(handles);
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, drain).await.is_err() {
        tracing::warn!("Background tasks did not stop in time");
    }

    tracing::info!("Dispatch engine stopped");
    Ok(())
}

/// Log every fan-out envelope at debug level.
fn spawn_event_logger(
    publisher: &BroadcastEventPublisher,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    let mut receiver = publisher.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                received = receiver.recv() => match received {
                    Ok(envelope) => tracing::debug!(
                        topic = %envelope.topic,
                        event = envelope.event_name,
                        "Fan-out event"
                    ),
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Event logger lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    })
}

/// Seed demo accounts and dispatch one master order.
async fn spawn_demo(
    container: &EngineContainer,
    shutdown: CancellationToken,
) -> anyhow::Result<JoinHandle<()>> {
    use dispatch_engine::domain::accounts::AccountRepository;

    let accounts = container.accounts();
    for account in [
        Account::new("acc-alpha", "Alpha", Money::from_units(500_000)).with_tags(["demo"]),
        Account::new("acc-beta", "Beta", Money::from_units(250_000)).with_tags(["demo"]),
        Account::new("acc-gamma", "Gamma", Money::from_units(100_000)).with_tags(["demo"]),
    ] {
        accounts.upsert_account(&account).await?;
    }

    let hub = container.connection_hub();
    hub.on_connect(&"acc-alpha".into(), ConnectionId::generate()).await;
    hub.on_connect(&"acc-beta".into(), ConnectionId::generate()).await;

    let dispatch = container.create_and_dispatch_use_case();
    let query = container.query_masters_use_case();
    let heartbeat_every = container.presence().ttl() / 3;

    Ok(tokio::spawn(async move {
        let request = DispatchRequest::market("INFY", OrderSide::Buy, 100, 50);
        let master_id = match dispatch.execute(&request).await {
            Ok(result) => {
                tracing::info!(
                    master_order_id = %result.master_order_id,
                    effective_price = %result.effective_price,
                    children = result.dispatch_plan.len(),
                    "Demo master dispatched"
                );
                result.master_order_id
            }
            Err(e) => {
                tracing::warn!(code = %e.code(), error = %e, "Demo dispatch refused");
                return;
            }
        };

        let mut ticker = tokio::time::interval(heartbeat_every);
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    hub.on_heartbeat(&"acc-alpha".into());
                    hub.on_heartbeat(&"acc-beta".into());
                    if let Ok(view) = query.get_master(&master_id).await {
                        let summary = view.master.summary();
                        tracing::info!(
                            master_order_id = %master_id,
                            status = %view.master.status(),
                            filled_qty = summary.filled_qty,
                            avg_price = %summary.avg_price,
                            "Demo master progress"
                        );
                    }
                }
            }
        }
    }))
}
