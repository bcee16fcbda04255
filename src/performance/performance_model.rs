use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::valuation::EntityRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ReturnMethod {
    #[default]
    TimeWeighted,
    ModifiedDietz,
}

impl ReturnMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnMethod::TimeWeighted => "TWR",
            ReturnMethod::ModifiedDietz => "MOD_DIETZ",
        }
    }
}

/// One day's fractional return for an entity (0.0042 = 0.42%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReturn {
    pub return_date: NaiveDate,
    pub entity: EntityRef,
    pub reporting_currency: String,
    pub value: Decimal,
}

/// Cumulative linked-to-date return point, for charting growth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnData {
    pub date: NaiveDate,
    pub value: Decimal,
}

/// Period return for one entity under one methodology, with the boundary
/// values and flows that produced it so callers can cross-check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPerformance {
    pub id: String,
    pub entity: EntityRef,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub reporting_currency: String,
    pub method: ReturnMethod,
    pub value: Decimal,
    pub annualized: Decimal,
    pub beginning_value: Money,
    pub ending_value: Money,
    pub net_flows: Money,
    pub gain_loss_amount: Money,
    /// Dividends and interest credited inside the period, from the valuation
    /// series' per-day income.
    pub income: Money,
    /// Cumulative return series over the period; empty for Modified Dietz,
    /// which needs no daily series.
    pub returns: Vec<ReturnData>,
}

/// Standard trailing-window returns as of one date, each a linked fractional
/// return over the clamped window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingReturnSet {
    pub as_of: NaiveDate,
    pub one_month: Decimal,
    pub three_months: Decimal,
    pub six_months: Decimal,
    pub year_to_date: Decimal,
    pub one_year: Decimal,
    pub three_years: Decimal,
    pub since_inception: Decimal,
}

/// Linked return of one non-overlapping calendar-month bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturn {
    pub year: i32,
    pub month: u32,
    pub value: Decimal,
}

/// One year's months in order plus the year's linked return to date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReturnTable {
    pub year: i32,
    pub months: Vec<MonthlyReturn>,
    pub year_to_date: Decimal,
}
