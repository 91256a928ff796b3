use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::info;

use crate::config::AppConfig;
use crate::quotes::build_quote_source;

#[derive(Args, Clone)]
pub struct QuoteArgs {
    /// Ticker symbol, e.g. AAPL
    pub symbol: String,
}

pub struct QuoteCommand {
    args: QuoteArgs,
}

impl QuoteCommand {
    pub fn new(args: QuoteArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        let quotes = build_quote_source(&config.quotes)?;
        info!(source = quotes.name(), symbol = %self.args.symbol, "fetching quote");

        let price = quotes.get_quote(&self.args.symbol).await?;
        println!("{} ${:.2}", self.args.symbol.bright_cyan(), price);
        Ok(())
    }
}
