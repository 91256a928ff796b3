//! Quote source collaborators
//!
//! The ledger treats price lookup as an opaque, possibly slow, possibly
//! failing external dependency behind the [`QuoteSource`] trait. Two
//! implementations ship with the crate: a live HTTP client and an in-memory
//! table for demos and tests.

pub mod fixed;
pub mod yahoo;

pub use fixed::FixedQuotes;
pub use yahoo::YahooQuoteClient;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{QuoteProvider, QuotesConfig};

/// Failures from a quote lookup.
#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Transport(String),
    #[error("quote request timed out after {0:?}")]
    Timeout(Duration),
    #[error("unexpected quote response: {0}")]
    BadResponse(String),
}

/// Price-by-symbol lookup collaborator.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Name of the source for logs
    fn name(&self) -> &str;

    /// Latest traded price for one symbol. Prices are always positive.
    async fn get_quote(&self, symbol: &str) -> Result<Decimal, QuoteError>;
}

/// Build the quote source selected by configuration.
pub fn build_quote_source(config: &QuotesConfig) -> Result<Arc<dyn QuoteSource>> {
    match config.provider {
        QuoteProvider::Yahoo => Ok(Arc::new(YahooQuoteClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
        )?)),
        QuoteProvider::Fixed => Ok(Arc::new(FixedQuotes::from_prices(&config.prices))),
    }
}
