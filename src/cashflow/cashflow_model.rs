use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::money::Money;

pub const CASH_FLOW_KIND_DEPOSIT: &str = "DEPOSIT";
pub const CASH_FLOW_KIND_WITHDRAWAL: &str = "WITHDRAWAL";
pub const CASH_FLOW_KIND_FEE: &str = "FEE";
pub const CASH_FLOW_KIND_INTEREST: &str = "INTEREST";
pub const CASH_FLOW_KIND_DIVIDEND: &str = "DIVIDEND";
pub const CASH_FLOW_KIND_BUY: &str = "BUY";
pub const CASH_FLOW_KIND_SELL: &str = "SELL";
pub const CASH_FLOW_KIND_OTHER: &str = "OTHER";

/// Closed set of ledger event kinds the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashFlowKind {
    Deposit,
    Withdrawal,
    Fee,
    Interest,
    Dividend,
    Buy,
    Sell,
    Other,
}

impl CashFlowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashFlowKind::Deposit => CASH_FLOW_KIND_DEPOSIT,
            CashFlowKind::Withdrawal => CASH_FLOW_KIND_WITHDRAWAL,
            CashFlowKind::Fee => CASH_FLOW_KIND_FEE,
            CashFlowKind::Interest => CASH_FLOW_KIND_INTEREST,
            CashFlowKind::Dividend => CASH_FLOW_KIND_DIVIDEND,
            CashFlowKind::Buy => CASH_FLOW_KIND_BUY,
            CashFlowKind::Sell => CASH_FLOW_KIND_SELL,
            CashFlowKind::Other => CASH_FLOW_KIND_OTHER,
        }
    }
}

impl FromStr for CashFlowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            CASH_FLOW_KIND_DEPOSIT => Ok(CashFlowKind::Deposit),
            CASH_FLOW_KIND_WITHDRAWAL => Ok(CashFlowKind::Withdrawal),
            CASH_FLOW_KIND_FEE => Ok(CashFlowKind::Fee),
            CASH_FLOW_KIND_INTEREST => Ok(CashFlowKind::Interest),
            CASH_FLOW_KIND_DIVIDEND => Ok(CashFlowKind::Dividend),
            CASH_FLOW_KIND_BUY => Ok(CashFlowKind::Buy),
            CASH_FLOW_KIND_SELL => Ok(CashFlowKind::Sell),
            CASH_FLOW_KIND_OTHER => Ok(CashFlowKind::Other),
            _ => Err(format!("Unknown cash flow kind: {}", s)),
        }
    }
}

/// One dated ledger event. `amount` is a positive magnitude; direction
/// relative to the portfolio is derived from the kind by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowEvent {
    pub event_date: NaiveDate,
    pub amount: Money,
    pub kind: CashFlowKind,
}

impl CashFlowEvent {
    pub fn new(event_date: NaiveDate, amount: Money, kind: CashFlowKind) -> Self {
        CashFlowEvent {
            event_date,
            amount,
            kind,
        }
    }
}
