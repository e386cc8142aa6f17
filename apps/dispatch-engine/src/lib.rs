// Allow unwrap/expect in tests - tests should panic on unexpected errors
// Allow test-specific patterns and pedantic lints in test code
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::float_cmp,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Dispatch Engine - Copy-Trading Core
//!
//! Fans one master order out into per-account child orders and executes
//! each child against a simulated market.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Core business logic
//!   - `accounts`: Linked trading accounts and target selection
//!   - `allocation`: SAME_QTY, PROPORTIONAL, PERCENT and PER_ACCOUNT splits
//!   - `risk_management`: Price sanity, price band, margin
//!   - `order_dispatch`: Master and child lifecycles, fills, events
//!   - `fill_simulation`: Slice sizing, slippage and liquidity math
//!
//! - **Application**: Use cases and orchestration
//!   - `ports`: Quote source, fan-out, randomness, order store
//!   - `services`: Presence, planning, execution tasks, summary aggregation
//!   - `use_cases`: Preview, CreateAndDispatch, QueryMasters, CancelOrders
//!
//! - **Infrastructure**: Adapters
//!   - `persistence`: In-memory repositories
//!   - `market_data`: Random-walk and static quote sources
//!   - `realtime`: Broadcast fan-out, connection hub
//!   - `random`: Seeded and pinned random sources
//!   - `config`: Dependency injection container

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Use cases and port definitions.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

// =============================================================================
// Cross-cutting
// =============================================================================

/// YAML configuration.
pub mod config;

/// Error codes and the dispatch error type.
pub mod error;

/// Logging and metrics.
pub mod observability;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::accounts::{Account, Broker, TargetSelector};
pub use domain::allocation::{AllocationMode, AllocationParams, allocate};
pub use domain::order_dispatch::{
    ChildOrder, ChildStatus, Fill, MasterOrder, MasterStatus, OrderEvent, OrderSide, OrderType,
    ProductType, Validity,
};
pub use domain::shared::{AccountId, ChildOrderId, MasterOrderId, Money, Quote, Symbol};

// Application re-exports
pub use application::dto::{DispatchPreview, DispatchRequest, DispatchResult, MasterView};
pub use application::ports::{EventPublisherPort, NoOpEventPublisher, QuoteSourcePort, Topic};
pub use application::use_cases::{
    CancelOrdersUseCase, CreateAndDispatchUseCase, PreviewDispatchUseCase, QueryMastersUseCase,
};

// Infrastructure re-exports
pub use infrastructure::config::Container;
pub use infrastructure::market_data::{RandomWalkQuoteSource, StaticQuoteSource};
pub use infrastructure::persistence::{InMemoryAccountRepository, InMemoryOrderStore};
pub use infrastructure::random::{FixedRandom, SeededRandom, SequenceRandom};
pub use infrastructure::realtime::{BroadcastEventPublisher, ConnectionHub};

pub use config::{Config, load_config};
pub use error::{DispatchError, ErrorCode};
