use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::TRADING_DAYS_PER_YEAR;

/// Annualization basis for volatility. Trading-day series use 252;
/// portfolios valued every calendar day inject 365.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskSettings {
    pub annualization_days: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        RiskSettings {
            annualization_days: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Risk summary of a daily return series. `max_drawdown` is never positive;
/// peak and trough dates are absent when the series never declines from a
/// dated peak. `correlation_to_benchmark` is absent without a benchmark
/// series or with fewer than two overlapping dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskCard {
    pub volatility_annual: Decimal,
    pub max_drawdown: Decimal,
    pub peak_date: Option<NaiveDate>,
    pub trough_date: Option<NaiveDate>,
    pub sharpe: Decimal,
    pub hit_rate_daily: Decimal,
    pub correlation_to_benchmark: Option<Decimal>,
    pub observation_count: usize,
}
