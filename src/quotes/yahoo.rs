//! HTTP quote client for the YQL finance endpoint.

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{QuoteError, QuoteSource};

/// Quote client backed by the public YQL finance query endpoint.
///
/// One symbol is queried per request. The response envelope is
/// `{query:{results:{quote:{LastTradePriceOnly:"<price>"}}}}`; any provider
/// serving that shape (including a mock) satisfies the contract.
pub struct YahooQuoteClient {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct QuoteEnvelope {
    query: QueryResult,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    results: Option<Results>,
}

#[derive(Debug, Deserialize)]
struct Results {
    quote: Quote,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(rename = "LastTradePriceOnly")]
    last_trade_price_only: String,
}

impl YahooQuoteClient {
    /// `base_url` is the scheme+host part; the YQL path is fixed. `timeout`
    /// bounds the whole round trip and surfaces as [`QuoteError::Timeout`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(base_url)?.join("/v1/public/yql")?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }
}

#[async_trait]
impl QuoteSource for YahooQuoteClient {
    fn name(&self) -> &str {
        "yahoo-finance"
    }

    async fn get_quote(&self, symbol: &str) -> Result<Decimal, QuoteError> {
        let query = format!(
            "select LastTradePriceOnly from yahoo.finance.quotes where symbol = \"{symbol}\""
        );

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("env", "http://datatables.org/alltables.env"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QuoteError::Timeout(self.timeout)
                } else {
                    QuoteError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::BadResponse(format!(
                "status {status} for symbol {symbol}"
            )));
        }

        let envelope: QuoteEnvelope = response
            .json()
            .await
            .map_err(|e| QuoteError::BadResponse(e.to_string()))?;

        let results = envelope
            .query
            .results
            .ok_or_else(|| QuoteError::BadResponse(format!("no results for symbol {symbol}")))?;

        let raw = results.quote.last_trade_price_only;
        let price = Decimal::from_str(raw.trim())
            .map_err(|_| QuoteError::BadResponse(format!("unparsable price '{raw}'")))?;

        if price <= Decimal::ZERO {
            return Err(QuoteError::BadResponse(format!(
                "non-positive price {price} for symbol {symbol}"
            )));
        }

        debug!(%symbol, %price, "quote fetched");
        Ok(price)
    }
}
