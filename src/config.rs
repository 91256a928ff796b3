//! Service configuration: optional YAML file with environment overrides.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default quote endpoint (scheme + host; the YQL path is fixed).
pub const DEFAULT_QUOTE_URL: &str = "https://query.yahooapis.com";

const QUOTE_URL_ENV: &str = "PAPERTRADE_QUOTE_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub quotes: QuotesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotesConfig {
    pub provider: QuoteProvider,
    pub base_url: String,
    /// Bound on one quote round trip; expiry surfaces as a quote failure.
    pub timeout_secs: u64,
    /// Symbol → price table used by the `fixed` provider.
    pub prices: HashMap<String, Decimal>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteProvider {
    #[default]
    Yahoo,
    Fixed,
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            provider: QuoteProvider::Yahoo,
            base_url: DEFAULT_QUOTE_URL.to_string(),
            timeout_secs: 10,
            prices: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load from a YAML file when given, defaults otherwise, then apply env
    /// overrides (`PAPERTRADE_QUOTE_URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };

        if let Ok(url) = std::env::var(QUOTE_URL_ENV) {
            config.quotes.base_url = url;
        }

        Ok(config)
    }
}
