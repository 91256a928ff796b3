use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::display::{PurchaseSummaryFormatter, ValuationFormatter};
use crate::ledger::types::AllocationEntry;
use crate::ledger::Ledger;
use crate::quotes::{build_quote_source, FixedQuotes, QuoteSource};

#[derive(Args, Clone)]
pub struct DemoArgs {
    /// Allocation list, e.g. "AAPL:50%,GOOG:50%"
    pub allocations: String,

    /// Cash budget to allocate
    #[arg(long)]
    pub budget: Decimal,

    /// Fixed quote override SYMBOL=PRICE (repeatable; bypasses the configured
    /// source)
    #[arg(long = "price", value_parser = parse_price_override)]
    pub prices: Vec<(String, Decimal)>,
}

fn parse_price_override(raw: &str) -> Result<(String, Decimal), String> {
    let (symbol, price) = raw
        .split_once('=')
        .ok_or_else(|| format!("'{raw}' is not SYMBOL=PRICE"))?;
    let price = Decimal::from_str(price.trim()).map_err(|e| e.to_string())?;
    if price <= Decimal::ZERO {
        return Err(format!("price must be positive, got {price}"));
    }
    Ok((symbol.trim().to_string(), price))
}

pub struct DemoCommand {
    args: DemoArgs,
}

impl DemoCommand {
    pub fn new(args: DemoArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        let quotes: Arc<dyn QuoteSource> = if self.args.prices.is_empty() {
            build_quote_source(&config.quotes)?
        } else {
            let mut fixed = FixedQuotes::new();
            for (symbol, price) in &self.args.prices {
                fixed = fixed.with_price(symbol, *price);
            }
            Arc::new(fixed)
        };
        info!(source = quotes.name(), budget = %self.args.budget, "running demo purchase");

        let ledger = Ledger::new(quotes);
        let allocations = AllocationEntry::parse_list(&self.args.allocations)?;

        let purchase = ledger
            .execute_purchase(self.args.budget, &allocations)
            .await?;
        println!("{}", PurchaseSummaryFormatter::new(&purchase).format_table());

        let valuation = ledger.value_trade(&purchase.trade_id.to_string()).await?;
        println!("{}", ValuationFormatter::new(&valuation).format_table());

        println!(
            "{} trade {} holds ${:.2} at market plus ${:.2} uninvested",
            "✓".bright_green(),
            purchase.trade_id.to_string().bright_cyan(),
            valuation.market_value,
            valuation.uninvested
        );
        Ok(())
    }
}
