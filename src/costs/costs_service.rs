use chrono::NaiveDate;
use num_traits::Zero;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::cashflow::CashFlowKind;
use crate::constants::DECIMAL_PRECISION;
use crate::costs::{SecurityCostSummary, Transaction, TransactionCostSummary};
use crate::errors::{Error, Result, ValidationError};

/// Transaction types that carry execution costs worth summarizing.
fn is_cost_bearing(kind: CashFlowKind) -> bool {
    matches!(
        kind,
        CashFlowKind::Buy | CashFlowKind::Sell | CashFlowKind::Dividend | CashFlowKind::Interest
    )
}

fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Start date must be before end date".to_string(),
        )));
    }
    Ok(())
}

/// One cost summary per currency over `[start, end]`, ordered by currency.
pub fn summarize_by_currency(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<TransactionCostSummary>> {
    validate_range(start, end)?;

    let mut by_currency: BTreeMap<String, TransactionCostSummary> = BTreeMap::new();
    for transaction in transactions {
        if transaction.transaction_date < start || transaction.transaction_date > end {
            continue;
        }
        if !is_cost_bearing(transaction.kind) {
            continue;
        }
        by_currency
            .entry(transaction.currency.clone())
            .or_insert_with(|| TransactionCostSummary::new(&transaction.currency))
            .add(transaction);
    }

    Ok(by_currency
        .into_values()
        .map(|mut summary| {
            summary.round();
            summary
        })
        .collect())
}

/// The same aggregation grouped by `(symbol, currency, kind)`, ordered by
/// symbol then currency.
pub fn summarize_by_security(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<SecurityCostSummary>> {
    validate_range(start, end)?;

    let mut cells: BTreeMap<(String, String, String), (CashFlowKind, u64, Decimal, Decimal)> =
        BTreeMap::new();
    for transaction in transactions {
        if transaction.transaction_date < start || transaction.transaction_date > end {
            continue;
        }
        if !is_cost_bearing(transaction.kind) {
            continue;
        }
        let key = (
            transaction.symbol.clone(),
            transaction.currency.clone(),
            transaction.kind.as_str().to_string(),
        );
        let cell = cells
            .entry(key)
            .or_insert((transaction.kind, 0, Decimal::zero(), Decimal::zero()));
        cell.1 += 1;
        cell.2 += transaction.gross_amount;
        cell.3 += transaction.cost_amount;
    }

    Ok(cells
        .into_iter()
        .map(|((symbol, currency, _), (kind, count, gross, costs))| {
            let rate = if gross.is_zero() {
                Decimal::zero()
            } else {
                costs / gross
            };
            SecurityCostSummary {
                symbol,
                currency,
                kind,
                count,
                gross_amount: gross.round_dp(DECIMAL_PRECISION),
                cost_amount: costs.round_dp(DECIMAL_PRECISION),
                cost_rate: rate.round_dp(DECIMAL_PRECISION),
            }
        })
        .collect())
}
