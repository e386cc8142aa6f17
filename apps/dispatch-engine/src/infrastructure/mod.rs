//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `persistence/`: in-memory account and order stores
//! - `market_data/`: random-walk and static quote sources
//! - `realtime/`: broadcast fan-out and the connection hub
//! - `random/`: seeded and pinned random sources
//! - `config/`: dependency injection container

pub mod config;
pub mod market_data;
pub mod persistence;
pub mod random;
pub mod realtime;
