//! Table formatters for purchase and valuation summaries.

use crate::ledger::types::{CostTrend, PurchaseSummary, ValuationSummary};

/// Format a purchase summary as a table
pub struct PurchaseSummaryFormatter<'a> {
    pub summary: &'a PurchaseSummary,
}

impl<'a> PurchaseSummaryFormatter<'a> {
    pub fn new(summary: &'a PurchaseSummary) -> Self {
        Self { summary }
    }

    pub fn format_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Trade #{}\n", self.summary.trade_id));
        output.push_str("┌──────────┬────────────┬──────────────┐\n");
        output.push_str("│ Symbol   │     Shares │        Price │\n");
        output.push_str("├──────────┼────────────┼──────────────┤\n");

        for fill in &self.summary.fills {
            output.push_str(&format!(
                "│ {:<8} │ {:>10} │ ${:>11.2} │\n",
                fill.symbol, fill.shares, fill.price
            ));
        }

        output.push_str("├──────────┴────────────┼──────────────┤\n");
        output.push_str(&format!(
            "│ Uninvested            │ ${:>11.2} │\n",
            self.summary.uninvested
        ));
        output.push_str("└───────────────────────┴──────────────┘\n");

        output
    }
}

/// Format a valuation summary as a table
pub struct ValuationFormatter<'a> {
    pub summary: &'a ValuationSummary,
}

impl<'a> ValuationFormatter<'a> {
    pub fn new(summary: &'a ValuationSummary) -> Self {
        Self { summary }
    }

    pub fn format_table(&self) -> String {
        if self.summary.holdings.is_empty() && self.summary.uninvested.is_zero() {
            return "No holdings.\n".to_string();
        }

        let mut output = String::new();

        output.push_str("┌──────────┬────────────┬──────────────┬───────┐\n");
        output.push_str("│ Symbol   │     Shares │        Price │ Trend │\n");
        output.push_str("├──────────┼────────────┼──────────────┼───────┤\n");

        for holding in &self.summary.holdings {
            let trend = match holding.trend {
                CostTrend::Gain => "▲",
                CostTrend::Loss => "▼",
                CostTrend::Flat => "=",
            };
            output.push_str(&format!(
                "│ {:<8} │ {:>10} │ ${:>11.2} │ {:^5} │\n",
                holding.symbol, holding.shares, holding.current_price, trend
            ));
        }

        output.push_str("├──────────┴────────────┼──────────────┼───────┤\n");
        output.push_str(&format!(
            "│ Market value          │ ${:>11.2} │       │\n",
            self.summary.market_value
        ));
        output.push_str(&format!(
            "│ Uninvested            │ ${:>11.2} │       │\n",
            self.summary.uninvested
        ));
        output.push_str("└───────────────────────┴──────────────┴───────┘\n");

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{Fill, HoldingValuation, TradeId};
    use rust_decimal_macros::dec;

    #[test]
    fn purchase_table_lists_fills_and_leftover() {
        let summary = PurchaseSummary {
            trade_id: TradeId(42),
            fills: vec![Fill {
                symbol: "AAA".into(),
                shares: 5,
                price: dec!(100),
            }],
            uninvested: dec!(20),
        };

        let table = PurchaseSummaryFormatter::new(&summary).format_table();
        assert!(table.contains("#42"));
        assert!(table.contains("AAA"));
        assert!(table.contains("100.00"));
        assert!(table.contains("20.00"));
    }

    #[test]
    fn valuation_table_marks_trends() {
        let summary = ValuationSummary {
            holdings: vec![HoldingValuation {
                symbol: "AAA".into(),
                shares: 5,
                trend: CostTrend::Gain,
                current_price: dec!(120),
            }],
            uninvested: dec!(20),
            market_value: dec!(600),
        };

        let table = ValuationFormatter::new(&summary).format_table();
        assert!(table.contains("▲"));
        assert!(table.contains("600.00"));
    }

    #[test]
    fn empty_valuation_has_a_placeholder() {
        let summary = ValuationSummary {
            holdings: vec![],
            uninvested: dec!(0),
            market_value: dec!(0),
        };
        assert_eq!(ValuationFormatter::new(&summary).format_table(), "No holdings.\n");
    }
}
