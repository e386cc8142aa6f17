//! Quote Source Port (Driven Port)
//!
//! Read access to the current top of book for a symbol.

use async_trait::async_trait;

use crate::domain::shared::{Quote, Symbol};

/// Port for resolving the latest quote of a symbol.
#[async_trait]
pub trait QuoteSourcePort: Send + Sync {
    /// Latest quote, or `None` when the symbol is unknown to the source.
    async fn quote(&self, symbol: &Symbol) -> Option<Quote>;
}
