//! Ledger type definitions with strong typing

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::errors::LedgerError;

/// Opaque handle for one purchase call's portfolio.
///
/// Issued by [`crate::ledger::TradeIdAllocator`]; values are unique and
/// strictly increasing for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TradeId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(TradeId)
    }
}

/// One `(symbol, percentage-of-budget)` instruction within a purchase request.
///
/// The wire format is the legacy `"SYM:40%"` string; it is parsed into this
/// validated structure before it reaches the ledger core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationEntry {
    pub symbol: String,
    /// Percentage of the total budget, e.g. `40` for 40%.
    pub percent: Decimal,
}

impl AllocationEntry {
    /// Parse a single `"SYM:40%"` pair. The `%` suffix is optional, matching
    /// the legacy service.
    pub fn parse_wire(raw: &str) -> Result<Self, LedgerError> {
        let mut parts = raw.split(':');
        let (symbol, percent) = match (parts.next(), parts.next(), parts.next()) {
            (Some(symbol), Some(percent), None) => (symbol.trim(), percent.trim()),
            _ => return Err(LedgerError::MalformedAllocation(raw.to_string())),
        };

        if symbol.is_empty() {
            return Err(LedgerError::MalformedAllocation(raw.to_string()));
        }

        let percent = percent.strip_suffix('%').unwrap_or(percent).trim();
        let percent = Decimal::from_str(percent)
            .map_err(|_| LedgerError::MalformedAllocation(raw.to_string()))?;

        if percent < Decimal::ZERO {
            return Err(LedgerError::MalformedAllocation(raw.to_string()));
        }

        Ok(Self {
            symbol: symbol.to_string(),
            percent,
        })
    }

    /// Parse a comma-separated allocation list such as `"AAPL:50%,GOOG:50%"`.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, LedgerError> {
        raw.split(',').map(Self::parse_wire).collect()
    }
}

/// Shares held for one symbol within a trade.
///
/// `avg_cost` is the quantity-weighted average fill price across every
/// purchase of the symbol in that trade. A holding with zero shares is never
/// stored, which keeps the weighted-average update free of a zero divisor.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub shares: u64,
    pub avg_cost: Decimal,
}

/// All state owned by a single trade id.
#[derive(Debug, Clone)]
pub struct Portfolio {
    /// Holdings keyed by symbol (keys unique).
    pub holdings: HashMap<String, Holding>,
    /// Budget left uninvested by whole-share rounding. Only ever grows.
    pub uninvested_cash: Decimal,
    pub opened_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            holdings: HashMap::new(),
            uninvested_cash: Decimal::ZERO,
            opened_at: now,
            updated_at: now,
        }
    }

    /// Total value at cost basis: `Σ shares × avg_cost`. Equals the
    /// cumulative amount spent across all purchase calls for this trade.
    pub fn invested_value(&self) -> Decimal {
        self.holdings
            .values()
            .map(|h| Decimal::from(h.shares) * h.avg_cost)
            .sum()
    }
}

impl Default for Portfolio {
    fn default() -> Self {
        Self::new()
    }
}

/// Current price classified against the cost basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CostTrend {
    Gain,
    Loss,
    Flat,
}

impl CostTrend {
    pub fn classify(current: Decimal, basis: Decimal) -> Self {
        if current > basis {
            CostTrend::Gain
        } else if current < basis {
            CostTrend::Loss
        } else {
            CostTrend::Flat
        }
    }
}

/// One executed allocation entry: shares bought at the quoted price.
///
/// Zero-share fills are recorded here as line items even though they leave
/// the portfolio untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub symbol: String,
    pub shares: u64,
    pub price: Decimal,
}

/// Result of one purchase call.
#[derive(Debug, Clone)]
pub struct PurchaseSummary {
    pub trade_id: TradeId,
    pub fills: Vec<Fill>,
    /// Leftover budget added to the trade's uninvested cash.
    pub uninvested: Decimal,
}

/// One holding annotated with its current quote.
#[derive(Debug, Clone)]
pub struct HoldingValuation {
    pub symbol: String,
    pub shares: u64,
    pub trend: CostTrend,
    pub current_price: Decimal,
}

/// Point-in-time market value of a trade.
///
/// Holding order follows map iteration and is not stable; callers must not
/// depend on it.
#[derive(Debug, Clone)]
pub struct ValuationSummary {
    pub holdings: Vec<HoldingValuation>,
    pub uninvested: Decimal,
    pub market_value: Decimal,
}
