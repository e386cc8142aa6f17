//! Application Layer
//!
//! The application layer orchestrates domain logic through use cases.
//! It defines:
//!
//! - **Ports**: Interfaces for quotes, fan-out, randomness and storage
//! - **Services**: Presence, planning, execution and summary aggregation
//! - **Use Cases**: Preview, dispatch, query and cancel
//! - **DTOs**: Data transfer objects for the API boundary

pub mod dto;
pub mod ports;
pub mod services;
pub mod use_cases;

pub use dto::*;
pub use ports::*;
pub use services::*;
pub use use_cases::*;
