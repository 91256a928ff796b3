//! Request-level failure taxonomy for the portfolio ledger.

use thiserror::Error;

use crate::ledger::types::TradeId;
use crate::quotes::QuoteError;

/// Failures surfaced to the caller of a purchase or valuation request.
///
/// None of these abort the process; every request either succeeds or maps to
/// exactly one of these variants.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The allocation list (or budget) could not be parsed into valid
    /// `(symbol, percentage)` pairs.
    #[error("malformed allocation: {0}")]
    MalformedAllocation(String),

    /// The quote collaborator failed or timed out for a symbol.
    #[error("quote unavailable for {symbol}")]
    QuoteUnavailable {
        symbol: String,
        #[source]
        source: QuoteError,
    },

    /// The trade id string is not a number.
    #[error("invalid trade id '{0}'")]
    InvalidTradeId(String),

    /// The trade id parses but was never issued by this process.
    #[error("unknown trade id {0}")]
    UnknownTrade(TradeId),
}
