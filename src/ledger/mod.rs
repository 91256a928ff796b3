//! Portfolio ledger and accounting engine
//!
//! Owns all trade state: trade identity issuance, purchase allocation with
//! weighted-average cost basis, uninvested-cash tracking, and point-in-time
//! valuation against the quote source.

pub mod engine;
pub mod ids;
pub mod types;

pub use engine::Ledger;
pub use ids::TradeIdAllocator;
pub use types::{
    AllocationEntry, CostTrend, Fill, Holding, HoldingValuation, Portfolio, PurchaseSummary,
    TradeId, ValuationSummary,
};
