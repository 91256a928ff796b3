//! Wire types compatible with the legacy JSON surface.
//!
//! Transport framing stays external; these are the request/response shapes
//! plus the thin handlers that parse the ad-hoc allocation string at the
//! boundary and format line items the way the legacy service did.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;
use crate::ledger::types::{AllocationEntry, CostTrend, Fill, HoldingValuation, TradeId};
use crate::ledger::Ledger;

/// `{"budget": 1000, "allocations": "AAA:50%,BBB:50%"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(with = "rust_decimal::serde::float")]
    pub budget: Decimal,
    pub allocations: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub trade_id: TradeId,
    /// `"<symbol>:<shares>:$<price>"` per allocation entry, in input order.
    pub stocks: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub uninvested_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub trade_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    /// `"<symbol>:<shares>:<+$|-$|$><price>"` per holding.
    pub stocks: Vec<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub current_market_value: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub uninvested_amount: Decimal,
}

/// One line-delimited request as read by `papertrade rpc`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "lowercase")]
pub enum RpcRequest {
    Buy(PurchaseRequest),
    Check(CheckRequest),
}

pub async fn handle_purchase(
    ledger: &Ledger,
    request: PurchaseRequest,
) -> Result<PurchaseResponse, LedgerError> {
    let allocations = AllocationEntry::parse_list(&request.allocations)?;
    let summary = ledger.execute_purchase(request.budget, &allocations).await?;
    Ok(PurchaseResponse {
        trade_id: summary.trade_id,
        stocks: summary.fills.iter().map(format_fill).collect(),
        uninvested_amount: summary.uninvested,
    })
}

pub async fn handle_check(
    ledger: &Ledger,
    request: CheckRequest,
) -> Result<CheckResponse, LedgerError> {
    let summary = ledger.value_trade(&request.trade_id).await?;
    Ok(CheckResponse {
        stocks: summary.holdings.iter().map(format_valuation).collect(),
        current_market_value: summary.market_value,
        uninvested_amount: summary.uninvested,
    })
}

/// Route one decoded request to its handler and serialize the response.
pub async fn dispatch(ledger: &Ledger, request: RpcRequest) -> anyhow::Result<serde_json::Value> {
    let response = match request {
        RpcRequest::Buy(request) => serde_json::to_value(handle_purchase(ledger, request).await?)?,
        RpcRequest::Check(request) => serde_json::to_value(handle_check(ledger, request).await?)?,
    };
    Ok(response)
}

pub fn format_fill(fill: &Fill) -> String {
    format!("{}:{}:${:.2}", fill.symbol, fill.shares, fill.price)
}

pub fn format_valuation(holding: &HoldingValuation) -> String {
    let marker = match holding.trend {
        CostTrend::Gain => "+$",
        CostTrend::Loss => "-$",
        CostTrend::Flat => "$",
    };
    format!(
        "{}:{}:{}{:.2}",
        holding.symbol, holding.shares, marker, holding.current_price
    )
}
