//! Portfolio ledger: purchase allocation and point-in-time valuation.

use dashmap::DashMap;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::LedgerError;
use crate::ledger::ids::TradeIdAllocator;
use crate::ledger::types::{
    AllocationEntry, CostTrend, Fill, Holding, HoldingValuation, Portfolio, PurchaseSummary,
    TradeId, ValuationSummary,
};
use crate::quotes::{QuoteError, QuoteSource};

/// Process-wide trade state and the accounting rules that mutate it.
///
/// Portfolios live in a sharded map, so concurrent purchases on distinct
/// trades do not block each other. Quote lookups are always performed with no
/// shard guard held; mutations happen under a short-held per-key guard
/// afterwards.
pub struct Ledger {
    quotes: Arc<dyn QuoteSource>,
    portfolios: DashMap<TradeId, Portfolio>,
    ids: TradeIdAllocator,
}

impl Ledger {
    pub fn new(quotes: Arc<dyn QuoteSource>) -> Self {
        Self::with_allocator(quotes, TradeIdAllocator::new())
    }

    /// Construct with a caller-provided id allocator (deterministic tests).
    pub fn with_allocator(quotes: Arc<dyn QuoteSource>, ids: TradeIdAllocator) -> Self {
        Self {
            quotes,
            portfolios: DashMap::new(),
            ids,
        }
    }

    /// Snapshot of one trade's portfolio, if it exists.
    pub fn portfolio(&self, trade_id: TradeId) -> Option<Portfolio> {
        self.portfolios.get(&trade_id).map(|p| p.value().clone())
    }

    /// Buy whole shares for each allocation entry against the given budget.
    ///
    /// Entries are processed in input order; every entry's amount is computed
    /// against the *original* budget, not a depleting balance. A quote
    /// failure aborts the remaining entries but keeps the purchases already
    /// applied; no uninvested cash is booked for an aborted call.
    pub async fn execute_purchase(
        &self,
        budget: Decimal,
        allocations: &[AllocationEntry],
    ) -> Result<PurchaseSummary, LedgerError> {
        if budget <= Decimal::ZERO {
            return Err(LedgerError::MalformedAllocation(format!(
                "budget must be positive, got {budget}"
            )));
        }

        let total_percent: Decimal = allocations.iter().map(|entry| entry.percent).sum();
        if total_percent > Decimal::ONE_HUNDRED {
            return Err(LedgerError::MalformedAllocation(format!(
                "allocations claim {total_percent}% of the budget"
            )));
        }

        let trade_id = self.ids.next_id();
        self.portfolios.insert(trade_id, Portfolio::new());
        info!(
            %trade_id,
            %budget,
            entries = allocations.len(),
            "executing purchase"
        );

        let mut fills = Vec::with_capacity(allocations.len());
        let mut spent_total = Decimal::ZERO;

        for entry in allocations {
            let allocated = budget * entry.percent / Decimal::ONE_HUNDRED;

            // Quote first, with no shard guard held: a slow lookup must not
            // serialize unrelated trades.
            let price = self.quotes.get_quote(&entry.symbol).await.map_err(|source| {
                LedgerError::QuoteUnavailable {
                    symbol: entry.symbol.clone(),
                    source,
                }
            })?;
            if price <= Decimal::ZERO {
                return Err(LedgerError::QuoteUnavailable {
                    symbol: entry.symbol.clone(),
                    source: QuoteError::BadResponse(format!("non-positive price {price}")),
                });
            }

            // Whole shares only, always rounded down so the budget is never
            // overspent. An unrepresentable share count degrades to a no-op
            // fill.
            let shares = (allocated / price).floor().to_u64().unwrap_or(0);
            let spent = Decimal::from(shares) * price;

            if shares > 0 {
                if let Some(mut portfolio) = self.portfolios.get_mut(&trade_id) {
                    match portfolio.holdings.get_mut(&entry.symbol) {
                        Some(holding) => {
                            let total_cost =
                                Decimal::from(holding.shares) * holding.avg_cost + spent;
                            holding.avg_cost = total_cost / Decimal::from(holding.shares + shares);
                            holding.shares += shares;
                        }
                        None => {
                            portfolio.holdings.insert(
                                entry.symbol.clone(),
                                Holding {
                                    shares,
                                    avg_cost: price,
                                },
                            );
                        }
                    }
                    portfolio.updated_at = chrono::Utc::now();
                }
            } else {
                debug!(%trade_id, symbol = %entry.symbol, %price, "allocation rounds to zero shares");
            }

            spent_total += spent;
            fills.push(Fill {
                symbol: entry.symbol.clone(),
                shares,
                price,
            });
        }

        let leftover = budget - spent_total;
        if let Some(mut portfolio) = self.portfolios.get_mut(&trade_id) {
            portfolio.uninvested_cash += leftover;
            portfolio.updated_at = chrono::Utc::now();
        }

        info!(%trade_id, spent = %spent_total, %leftover, "purchase complete");
        Ok(PurchaseSummary {
            trade_id,
            fills,
            uninvested: leftover,
        })
    }

    /// Value a trade against current quotes.
    ///
    /// A quote failure for any held symbol fails the whole request; no
    /// partial valuation is returned.
    pub async fn value_trade(&self, raw_id: &str) -> Result<ValuationSummary, LedgerError> {
        let trade_id: TradeId = raw_id
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidTradeId(raw_id.to_string()))?;

        // Clone the portfolio out under a short guard; quotes are fetched
        // with no shard held.
        let portfolio = self
            .portfolios
            .get(&trade_id)
            .map(|p| p.value().clone())
            .ok_or(LedgerError::UnknownTrade(trade_id))?;

        let lookups = portfolio.holdings.iter().map(|(symbol, holding)| {
            let symbol = symbol.clone();
            let holding = holding.clone();
            async move {
                let price = self.quotes.get_quote(&symbol).await.map_err(|source| {
                    LedgerError::QuoteUnavailable {
                        symbol: symbol.clone(),
                        source,
                    }
                })?;
                Ok::<_, LedgerError>((symbol, holding, price))
            }
        });
        let quoted = futures::future::try_join_all(lookups).await?;

        let mut market_value = Decimal::ZERO;
        let mut holdings = Vec::with_capacity(quoted.len());
        for (symbol, holding, price) in quoted {
            market_value += Decimal::from(holding.shares) * price;
            holdings.push(HoldingValuation {
                symbol,
                shares: holding.shares,
                trend: CostTrend::classify(price, holding.avg_cost),
                current_price: price,
            });
        }

        info!(%trade_id, %market_value, holdings = holdings.len(), "trade valued");
        Ok(ValuationSummary {
            holdings,
            uninvested: portfolio.uninvested_cash,
            market_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quotes::FixedQuotes;
    use rust_decimal_macros::dec;

    fn entry(symbol: &str, percent: Decimal) -> AllocationEntry {
        AllocationEntry {
            symbol: symbol.to_string(),
            percent,
        }
    }

    fn ledger_with(quotes: FixedQuotes, first_id: u64) -> Ledger {
        Ledger::with_allocator(Arc::new(quotes), TradeIdAllocator::with_seed(first_id))
    }

    #[tokio::test]
    async fn splits_budget_and_floors_to_whole_shares() {
        let quotes = FixedQuotes::new()
            .with_price("AAA", dec!(100))
            .with_price("BBB", dec!(30));
        let ledger = ledger_with(quotes, 1);

        let summary = ledger
            .execute_purchase(
                dec!(1000),
                &[entry("AAA", dec!(50)), entry("BBB", dec!(50))],
            )
            .await
            .unwrap();

        assert_eq!(summary.fills.len(), 2);
        assert_eq!(summary.fills[0].shares, 5); // 500 / 100
        assert_eq!(summary.fills[1].shares, 16); // floor(500 / 30)
        assert_eq!(summary.uninvested, dec!(20));

        let portfolio = ledger.portfolio(summary.trade_id).unwrap();
        assert_eq!(portfolio.invested_value(), dec!(980));
        assert_eq!(portfolio.uninvested_cash, dec!(20));
    }

    #[tokio::test]
    async fn full_allocation_leftover_stays_below_price() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(333));
        let ledger = ledger_with(quotes, 1);

        let summary = ledger
            .execute_purchase(dec!(1000), &[entry("AAA", dec!(100))])
            .await
            .unwrap();

        assert_eq!(summary.fills[0].shares, 3);
        assert_eq!(summary.uninvested, dec!(1));
        assert!(summary.uninvested >= Decimal::ZERO && summary.uninvested < dec!(333));
    }

    #[tokio::test]
    async fn repeat_symbol_uses_weighted_average_cost() {
        // The price moves between the two fills: 10 shares at 100, then 10 at
        // 120, giving a 110 average.
        let quotes = FixedQuotes::new()
            .with_price("AAA", dec!(100))
            .with_price("AAA", dec!(120));
        let ledger = ledger_with(quotes, 1);

        let summary = ledger
            .execute_purchase(
                dec!(4000),
                &[entry("AAA", dec!(25)), entry("AAA", dec!(30))],
            )
            .await
            .unwrap();

        let portfolio = ledger.portfolio(summary.trade_id).unwrap();
        let holding = &portfolio.holdings["AAA"];
        assert_eq!(holding.shares, 20);
        assert_eq!(holding.avg_cost, dec!(110));
        assert_eq!(portfolio.invested_value(), dec!(2200));
    }

    #[tokio::test]
    async fn zero_share_fill_skips_the_average_update() {
        let quotes = FixedQuotes::new()
            .with_price("AAA", dec!(100))
            .with_price("AAA", dec!(100));
        let ledger = ledger_with(quotes, 1);

        // Second entry allocates less than one share's worth.
        let summary = ledger
            .execute_purchase(
                dec!(1000),
                &[entry("AAA", dec!(50)), entry("AAA", dec!(5))],
            )
            .await
            .unwrap();

        let portfolio = ledger.portfolio(summary.trade_id).unwrap();
        let holding = &portfolio.holdings["AAA"];
        assert_eq!(holding.shares, 5);
        assert_eq!(holding.avg_cost, dec!(100));
        assert_eq!(summary.fills[1].shares, 0);
    }

    #[tokio::test]
    async fn unrepresentable_share_count_degrades_to_zero_shares() {
        // 2e19 shares at price 1 does not fit in u64; the fill records zero
        // shares and the whole budget stays uninvested.
        let quotes = FixedQuotes::new().with_price("AAA", dec!(1));
        let ledger = ledger_with(quotes, 1);

        let budget = dec!(20_000_000_000_000_000_000);
        let summary = ledger
            .execute_purchase(budget, &[entry("AAA", dec!(100))])
            .await
            .unwrap();

        assert_eq!(summary.fills[0].shares, 0);
        assert_eq!(summary.uninvested, budget);

        let portfolio = ledger.portfolio(summary.trade_id).unwrap();
        assert!(portfolio.holdings.is_empty());
        assert_eq!(portfolio.uninvested_cash, budget);
    }

    #[tokio::test]
    async fn all_zero_share_purchase_still_opens_the_trade() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(100));
        let ledger = ledger_with(quotes, 1);

        let summary = ledger
            .execute_purchase(dec!(50), &[entry("AAA", dec!(100))])
            .await
            .unwrap();
        assert_eq!(summary.uninvested, dec!(50));

        let valuation = ledger
            .value_trade(&summary.trade_id.to_string())
            .await
            .unwrap();
        assert!(valuation.holdings.is_empty());
        assert_eq!(valuation.market_value, Decimal::ZERO);
        assert_eq!(valuation.uninvested, dec!(50));
    }

    #[tokio::test]
    async fn valuation_classifies_gain_loss_and_flat() {
        let quotes = FixedQuotes::new()
            .with_price("UP", dec!(100))
            .with_price("UP", dec!(120))
            .with_price("DOWN", dec!(100))
            .with_price("DOWN", dec!(80))
            .with_price("SAME", dec!(100));
        let ledger = ledger_with(quotes, 1);

        let summary = ledger
            .execute_purchase(
                dec!(3000),
                &[
                    entry("UP", dec!(10)),
                    entry("DOWN", dec!(10)),
                    entry("SAME", dec!(10)),
                ],
            )
            .await
            .unwrap();

        let valuation = ledger
            .value_trade(&summary.trade_id.to_string())
            .await
            .unwrap();

        let trend_of = |symbol: &str| {
            valuation
                .holdings
                .iter()
                .find(|h| h.symbol == symbol)
                .map(|h| h.trend)
                .unwrap()
        };
        assert_eq!(trend_of("UP"), CostTrend::Gain);
        assert_eq!(trend_of("DOWN"), CostTrend::Loss);
        assert_eq!(trend_of("SAME"), CostTrend::Flat);

        // 3 × 120 + 3 × 80 + 3 × 100
        assert_eq!(valuation.market_value, dec!(900));
    }

    #[tokio::test]
    async fn unknown_and_invalid_trade_ids_are_distinct_errors() {
        let ledger = ledger_with(FixedQuotes::new(), 1);

        assert!(matches!(
            ledger.value_trade("999").await.unwrap_err(),
            LedgerError::UnknownTrade(TradeId(999))
        ));
        assert!(matches!(
            ledger.value_trade("not-a-number").await.unwrap_err(),
            LedgerError::InvalidTradeId(_)
        ));
    }

    #[tokio::test]
    async fn mid_batch_quote_failure_keeps_applied_entries() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(100));
        let ledger = ledger_with(quotes, 7);

        let err = ledger
            .execute_purchase(
                dec!(1000),
                &[entry("AAA", dec!(50)), entry("GHOST", dec!(50))],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::QuoteUnavailable { ref symbol, .. } if symbol.as_str() == "GHOST"
        ));

        // The first entry was applied and stays; no leftover was booked.
        let portfolio = ledger.portfolio(TradeId(7)).unwrap();
        assert_eq!(portfolio.holdings["AAA"].shares, 5);
        assert_eq!(portfolio.uninvested_cash, Decimal::ZERO);
    }

    #[tokio::test]
    async fn rejects_non_positive_budget_and_over_allocation() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(100));
        let ledger = ledger_with(quotes, 1);

        assert!(matches!(
            ledger
                .execute_purchase(dec!(0), &[entry("AAA", dec!(100))])
                .await
                .unwrap_err(),
            LedgerError::MalformedAllocation(_)
        ));
        assert!(matches!(
            ledger
                .execute_purchase(
                    dec!(1000),
                    &[entry("AAA", dec!(80)), entry("AAA", dec!(30))]
                )
                .await
                .unwrap_err(),
            LedgerError::MalformedAllocation(_)
        ));
    }

    #[tokio::test]
    async fn successive_purchases_issue_increasing_ids() {
        let quotes = FixedQuotes::new().with_price("AAA", dec!(100));
        let ledger = ledger_with(quotes, 100);

        let first = ledger
            .execute_purchase(dec!(1000), &[entry("AAA", dec!(50))])
            .await
            .unwrap();
        let second = ledger
            .execute_purchase(dec!(1000), &[entry("AAA", dec!(50))])
            .await
            .unwrap();
        assert!(second.trade_id > first.trade_id);
    }

    #[tokio::test]
    async fn concurrent_purchases_on_distinct_trades_lose_nothing() {
        let quotes = FixedQuotes::new()
            .with_price("AAA", dec!(100))
            .with_price("BBB", dec!(30));
        let ledger = Arc::new(ledger_with(quotes, 1));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger
                    .execute_purchase(
                        dec!(1000),
                        &[entry("AAA", dec!(50)), entry("BBB", dec!(50))],
                    )
                    .await
                    .unwrap()
                    .trade_id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 16, "trade ids must be unique");

        // Every trade matches a sequential replay of the same request.
        for id in ids {
            let portfolio = ledger.portfolio(id).unwrap();
            assert_eq!(portfolio.holdings["AAA"].shares, 5);
            assert_eq!(portfolio.holdings["BBB"].shares, 16);
            assert_eq!(portfolio.uninvested_cash, dec!(20));
        }
    }
}
