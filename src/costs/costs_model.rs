use chrono::NaiveDate;
use num_traits::Zero;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cashflow::CashFlowKind;
use crate::constants::DECIMAL_PRECISION;

/// One ledger transaction with its execution cost: commission and fees for
/// trades, withholding tax for dividend and interest credits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub account_id: String,
    pub symbol: String,
    pub kind: CashFlowKind,
    pub transaction_date: NaiveDate,
    pub currency: String,
    pub gross_amount: Decimal,
    pub cost_amount: Decimal,
}

/// Per-currency cost aggregation across transaction types, keyed by the
/// kind's string form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCostSummary {
    pub currency: String,
    pub total_costs: Decimal,
    pub counts_by_type: HashMap<String, u64>,
    pub costs_by_type: HashMap<String, Decimal>,
    pub gross_by_type: HashMap<String, Decimal>,
}

impl TransactionCostSummary {
    pub fn new(currency: &str) -> Self {
        TransactionCostSummary {
            currency: currency.to_string(),
            total_costs: Decimal::zero(),
            counts_by_type: HashMap::new(),
            costs_by_type: HashMap::new(),
            gross_by_type: HashMap::new(),
        }
    }

    pub fn add(&mut self, transaction: &Transaction) {
        let key = transaction.kind.as_str().to_string();
        *self.counts_by_type.entry(key.clone()).or_insert(0) += 1;
        *self
            .costs_by_type
            .entry(key.clone())
            .or_insert_with(Decimal::zero) += transaction.cost_amount;
        *self
            .gross_by_type
            .entry(key)
            .or_insert_with(Decimal::zero) += transaction.gross_amount;
        self.total_costs += transaction.cost_amount;
    }

    /// Cost per unit of gross for one transaction type; 0 when no gross.
    pub fn cost_rate(&self, kind: CashFlowKind) -> Decimal {
        let key = kind.as_str();
        let gross = self
            .gross_by_type
            .get(key)
            .copied()
            .unwrap_or_else(Decimal::zero);
        if gross.is_zero() {
            return Decimal::zero();
        }
        let costs = self
            .costs_by_type
            .get(key)
            .copied()
            .unwrap_or_else(Decimal::zero);
        costs / gross
    }

    pub fn round(&mut self) {
        self.total_costs = self.total_costs.round_dp(DECIMAL_PRECISION);
        for value in self.costs_by_type.values_mut() {
            *value = value.round_dp(DECIMAL_PRECISION);
        }
        for value in self.gross_by_type.values_mut() {
            *value = value.round_dp(DECIMAL_PRECISION);
        }
    }
}

/// The same aggregation sliced to one `(symbol, currency, kind)` cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityCostSummary {
    pub symbol: String,
    pub currency: String,
    pub kind: CashFlowKind,
    pub count: u64,
    pub gross_amount: Decimal,
    pub cost_amount: Decimal,
    pub cost_rate: Decimal,
}
