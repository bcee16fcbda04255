use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::cashflow::{CashFlowEvent, CashFlowKind};
use crate::errors::Result;

/// Configuration for the external/internal split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierSettings {
    /// Whether interest credits count as external flows (neutralized from
    /// return) or as internal income flowing through valuation.
    pub interest_is_external: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        ClassifierSettings {
            interest_is_external: true,
        }
    }
}

/// Splits ledger events into external flows, which must be neutralized when
/// computing time-weighted returns, and internal events, whose effect already
/// lives inside the valuation series and must not be double-counted.
#[derive(Debug, Clone, Default)]
pub struct CashFlowClassifier {
    settings: ClassifierSettings,
}

impl CashFlowClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        CashFlowClassifier { settings }
    }

    pub fn is_external(&self, kind: CashFlowKind) -> bool {
        match kind {
            CashFlowKind::Deposit | CashFlowKind::Withdrawal | CashFlowKind::Fee => true,
            CashFlowKind::Interest => self.settings.interest_is_external,
            CashFlowKind::Dividend
            | CashFlowKind::Buy
            | CashFlowKind::Sell
            | CashFlowKind::Other => false,
        }
    }

    /// Signed amount of an external flow relative to the portfolio, or `None`
    /// for internal events. Deposits and interest add money, withdrawals and
    /// fees remove it.
    pub fn signed_external_amount(&self, event: &CashFlowEvent) -> Option<Decimal> {
        if !self.is_external(event.kind) {
            return None;
        }
        let amount = event.amount.amount().abs();
        match event.kind {
            CashFlowKind::Deposit | CashFlowKind::Interest => Some(amount),
            CashFlowKind::Withdrawal | CashFlowKind::Fee => Some(-amount),
            _ => None,
        }
    }

    pub fn external_events<'a>(&self, events: &'a [CashFlowEvent]) -> Vec<&'a CashFlowEvent> {
        events.iter().filter(|e| self.is_external(e.kind)).collect()
    }

    /// Net signed external flow per date, all amounts verified to be in
    /// `reporting_currency`. Internal events are dropped.
    pub fn net_external_by_date(
        &self,
        events: &[CashFlowEvent],
        reporting_currency: &str,
    ) -> Result<BTreeMap<NaiveDate, Decimal>> {
        let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for event in events {
            if let Some(signed) = self.signed_external_amount(event) {
                event.amount.ensure_currency(reporting_currency)?;
                *by_date.entry(event.event_date).or_insert(Decimal::ZERO) += signed;
            }
        }
        Ok(by_date)
    }
}
