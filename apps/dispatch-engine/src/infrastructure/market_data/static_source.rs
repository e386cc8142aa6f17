//! Fixed quote source for tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::ports::QuoteSourcePort;
use crate::domain::shared::{Quote, Symbol};

/// Quote source that returns whatever was last set for a symbol.
#[derive(Debug, Default)]
pub struct StaticQuoteSource {
    quotes: RwLock<HashMap<Symbol, Quote>>,
}

impl StaticQuoteSource {
    /// Create an empty source; every symbol is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the quote for its symbol.
    pub fn set(&self, quote: Quote) {
        self.quotes.write().insert(quote.symbol.clone(), quote);
    }

    /// Forget a symbol.
    pub fn remove(&self, symbol: &Symbol) {
        self.quotes.write().remove(symbol);
    }
}

#[async_trait]
impl QuoteSourcePort for StaticQuoteSource {
    async fn quote(&self, symbol: &Symbol) -> Option<Quote> {
        self.quotes.read().get(symbol).cloned()
    }
}
