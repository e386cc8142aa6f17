//! Observability module for logging and metrics.
//!
//! Structured logging through `tracing` and Prometheus metrics through the
//! `metrics` facade.

mod metrics;
mod tracing;

pub use self::metrics::{
    MetricsError, init_metrics, record_child_created, record_child_terminal, record_dispatch,
    record_fill, update_online_accounts,
};
pub use self::tracing::{TracingError, init_tracing};
