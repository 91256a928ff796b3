pub mod cli;
pub mod config;
pub mod display;
pub mod errors;
pub mod ledger;
pub mod logging;
pub mod quotes;
pub mod rpc;

pub use errors::LedgerError;
pub use ledger::{Ledger, TradeId};
pub use quotes::QuoteSource;
