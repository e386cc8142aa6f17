//! Market Data Adapters
//!
//! Implementations of `QuoteSourcePort`.

pub mod random_walk;
pub mod static_source;

pub use random_walk::{MIN_SPEED, RandomWalkQuoteSource, TICK_EVENT};
pub use static_source::StaticQuoteSource;
