//! In-memory quote table for demos and tests.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;

use super::{QuoteError, QuoteSource};

/// Quote source backed by a fixed symbol → price table.
///
/// A symbol may carry a queue of prices: each lookup consumes the next one
/// and the final price sticks. That lets a test replay a moving market
/// between two fills of the same symbol.
pub struct FixedQuotes {
    prices: Mutex<HashMap<String, VecDeque<Decimal>>>,
}

impl FixedQuotes {
    pub fn new() -> Self {
        Self {
            prices: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_prices(prices: &HashMap<String, Decimal>) -> Self {
        let table = prices
            .iter()
            .map(|(symbol, price)| (symbol.clone(), VecDeque::from([*price])))
            .collect();
        Self {
            prices: Mutex::new(table),
        }
    }

    /// Builder-style price queueing; repeated calls for one symbol script a
    /// price sequence.
    pub fn with_price(mut self, symbol: &str, price: Decimal) -> Self {
        self.prices
            .get_mut()
            .entry(symbol.to_string())
            .or_default()
            .push_back(price);
        self
    }

    /// Queue a price behind any already queued for the symbol.
    pub async fn push_price(&self, symbol: &str, price: Decimal) {
        self.prices
            .lock()
            .await
            .entry(symbol.to_string())
            .or_default()
            .push_back(price);
    }
}

impl Default for FixedQuotes {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for FixedQuotes {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        let mut table = self.prices.lock().await;
        let queue = table
            .get_mut(symbol)
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| QuoteError::BadResponse(format!("no quote for symbol {symbol}")))?;

        if queue.len() > 1 {
            // consume the scripted price, keep the last one sticky
            Ok(queue
                .pop_front()
                .ok_or_else(|| QuoteError::BadResponse(format!("no quote for symbol {symbol}")))?)
        } else {
            Ok(queue[0])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn returns_configured_price() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(100));
        assert_eq!(quotes.get_quote("AAA").await.unwrap(), dec!(100));
    }

    #[tokio::test]
    async fn unknown_symbol_fails() {
        let quotes = FixedQuotes::new();
        assert!(matches!(
            quotes.get_quote("GHOST").await,
            Err(QuoteError::BadResponse(_))
        ));
    }

    #[tokio::test]
    async fn scripted_prices_are_consumed_in_order_and_last_sticks() {
        let quotes = FixedQuotes::new();
        quotes.push_price("AAA", dec!(100)).await;
        quotes.push_price("AAA", dec!(120)).await;

        assert_eq!(quotes.get_quote("AAA").await.unwrap(), dec!(100));
        assert_eq!(quotes.get_quote("AAA").await.unwrap(), dec!(120));
        assert_eq!(quotes.get_quote("AAA").await.unwrap(), dec!(120));
    }
}
