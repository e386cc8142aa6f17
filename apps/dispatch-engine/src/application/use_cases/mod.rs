//! Application Use Cases
//!
//! Use cases orchestrate domain logic and services to fulfill the exposed
//! operations: preview, dispatch, read and cancel.

mod cancel_orders;
mod create_and_dispatch;
mod preview_dispatch;
mod query_masters;

pub use cancel_orders::CancelOrdersUseCase;
pub use create_and_dispatch::CreateAndDispatchUseCase;
pub use preview_dispatch::PreviewDispatchUseCase;
pub use query_masters::{DEFAULT_RECENT_LIMIT, QueryMastersUseCase};
