//! Order Dispatch Bounded Context
//!
//! Master orders, the child orders they fan out into, and the fills that
//! execute them.
//!
//! # Key Concepts
//!
//! - **Master order**: the operator's single instruction
//! - **Child order**: one account's share, executed independently
//! - **Fill**: one execution slice against a child

pub mod aggregation;
pub mod child_order;
pub mod errors;
pub mod events;
pub mod fill;
pub mod master_order;
pub mod repository;
pub mod value_objects;

pub use aggregation::{FillTotals, fill_totals};
pub use child_order::{ChildOrder, ChildTimestamps, NewChildOrder};
pub use errors::OrderError;
pub use events::{
    AccountAssigned, ChildProgress, MasterCreated, MasterSummaryChanged, OrderEvent, PlannedChild,
};
pub use fill::Fill;
pub use master_order::{AuditAction, AuditEntry, CreateMasterCommand, MasterOrder, MasterSummary};
pub use repository::{ChildOrderRepository, FillRepository, MasterOrderRepository};
pub use value_objects::{
    ChildStatus, ExecutionFailure, ExecutionFailureCode, MasterStatus, OrderSide, OrderType,
    ProductType, Validity,
};
