//! Order dispatch value objects.

mod child_status;
mod master_status;
mod order_side;
mod order_type;
mod product_type;
mod reject_code;

pub use child_status::ChildStatus;
pub use master_status::MasterStatus;
pub use order_side::OrderSide;
pub use order_type::OrderType;
pub use product_type::{ProductType, Validity};
pub use reject_code::{ExecutionFailure, ExecutionFailureCode};
