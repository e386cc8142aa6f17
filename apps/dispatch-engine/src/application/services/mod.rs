//! Application Services
//!
//! Long-lived collaborators shared by the use cases: presence tracking,
//! planning, the per-child execution tasks and master summary aggregation.

mod child_task_registry;
mod dispatch_guard;
mod dispatch_planner;
mod execution_simulator;
mod presence_registry;
mod summary_aggregator;

pub use child_task_registry::ChildTaskRegistry;
pub use dispatch_guard::DispatchGuard;
pub use dispatch_planner::{DispatchPlan, DispatchPlanner, PlannedShare};
pub use execution_simulator::ExecutionSimulator;
pub use presence_registry::PresenceRegistry;
pub use summary_aggregator::{SummaryAggregator, summary_event};
