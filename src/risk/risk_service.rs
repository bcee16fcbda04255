use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::constants::{DECIMAL_PRECISION, SQRT_TRADING_DAYS_APPROX};
use crate::performance::return_calculator::link_returns;
use crate::performance::DailyReturn;
use crate::risk::{RiskCard, RiskSettings};

pub struct RiskService {
    settings: RiskSettings,
}

impl Default for RiskService {
    fn default() -> Self {
        Self::new(RiskSettings::default())
    }
}

impl RiskService {
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    /// Risk summary for a daily return series, with Pearson correlation to
    /// the benchmark series when one is supplied.
    pub fn risk_card(
        &self,
        daily: &[DailyReturn],
        benchmark: Option<&[DailyReturn]>,
    ) -> RiskCard {
        let values: Vec<Decimal> = daily.iter().map(|r| r.value).collect();

        let volatility = self.volatility(&values);
        let (max_drawdown, peak_date, trough_date) = Self::max_drawdown(daily);

        let linked = link_returns(values.iter().copied());
        let sharpe = if volatility.is_zero() {
            Decimal::ZERO
        } else {
            linked / volatility
        };

        let hit_rate = if values.is_empty() {
            Decimal::ZERO
        } else {
            let positive_days = values.iter().filter(|r| r.is_sign_positive() && !r.is_zero()).count();
            Decimal::from(positive_days) / Decimal::from(values.len())
        };

        let correlation = benchmark.and_then(|series| Self::correlation(daily, series));

        RiskCard {
            volatility_annual: volatility.round_dp(DECIMAL_PRECISION),
            max_drawdown: max_drawdown.round_dp(DECIMAL_PRECISION),
            peak_date,
            trough_date,
            sharpe: sharpe.round_dp(DECIMAL_PRECISION),
            hit_rate_daily: hit_rate.round_dp(DECIMAL_PRECISION),
            correlation_to_benchmark: correlation.map(|c| c.round_dp(DECIMAL_PRECISION)),
            observation_count: values.len(),
        }
    }

    /// Sample standard deviation scaled by sqrt of the annualization basis.
    fn volatility(&self, daily_returns: &[Decimal]) -> Decimal {
        if daily_returns.len() < 2 {
            return Decimal::ZERO;
        }

        let count = Decimal::from(daily_returns.len());
        let sum: Decimal = daily_returns.iter().sum();
        let mean = sum / count;

        let sum_squared_diff: Decimal = daily_returns
            .iter()
            .map(|&r| {
                let diff = r - mean;
                diff * diff
            })
            .sum();

        let variance = sum_squared_diff / (count - Decimal::ONE);
        if variance.is_sign_negative() {
            return Decimal::ZERO;
        }

        let daily_volatility = variance.sqrt().unwrap_or(Decimal::ZERO);

        let annualization_factor = Decimal::from(self.settings.annualization_days)
            .sqrt()
            .unwrap_or(SQRT_TRADING_DAYS_APPROX);

        daily_volatility * annualization_factor
    }

    /// Worst decline of the wealth index from its running peak, with the
    /// dates of the peak and the trough that realize it. The index anchors
    /// at 1 before the first return, so a series that only declines reports
    /// no peak date.
    fn max_drawdown(daily: &[DailyReturn]) -> (Decimal, Option<NaiveDate>, Option<NaiveDate>) {
        let mut wealth = Decimal::ONE;
        let mut peak_value = Decimal::ONE;
        let mut peak_date: Option<NaiveDate> = None;
        let mut max_drawdown = Decimal::ZERO;
        let mut drawdown_peak_date: Option<NaiveDate> = None;
        let mut trough_date: Option<NaiveDate> = None;

        for r in daily {
            wealth *= Decimal::ONE + r.value;
            if wealth > peak_value {
                peak_value = wealth;
                peak_date = Some(r.return_date);
            }
            if !peak_value.is_zero() {
                let drawdown = wealth / peak_value - Decimal::ONE;
                if drawdown < max_drawdown {
                    max_drawdown = drawdown;
                    drawdown_peak_date = peak_date;
                    trough_date = Some(r.return_date);
                }
            }
        }

        (max_drawdown.max(dec!(-1)), drawdown_peak_date, trough_date)
    }

    /// Pearson correlation over the dates both series cover. `None` with
    /// fewer than two overlapping points or when either side is flat.
    fn correlation(portfolio: &[DailyReturn], benchmark: &[DailyReturn]) -> Option<Decimal> {
        let benchmark_by_date: HashMap<NaiveDate, Decimal> = benchmark
            .iter()
            .map(|r| (r.return_date, r.value))
            .collect();

        let pairs: Vec<(Decimal, Decimal)> = portfolio
            .iter()
            .filter_map(|r| {
                benchmark_by_date
                    .get(&r.return_date)
                    .map(|b| (r.value, *b))
            })
            .collect();

        if pairs.len() < 2 {
            return None;
        }

        let count = Decimal::from(pairs.len());
        let mean_x: Decimal = pairs.iter().map(|(x, _)| *x).sum::<Decimal>() / count;
        let mean_y: Decimal = pairs.iter().map(|(_, y)| *y).sum::<Decimal>() / count;

        let mut covariance = Decimal::ZERO;
        let mut variance_x = Decimal::ZERO;
        let mut variance_y = Decimal::ZERO;
        for (x, y) in &pairs {
            let dx = *x - mean_x;
            let dy = *y - mean_y;
            covariance += dx * dy;
            variance_x += dx * dx;
            variance_y += dy * dy;
        }

        if variance_x.is_zero() || variance_y.is_zero() {
            return None;
        }

        match (variance_x.sqrt(), variance_y.sqrt()) {
            (Some(std_x), Some(std_y)) if !std_x.is_zero() && !std_y.is_zero() => {
                Some(covariance / (std_x * std_y))
            }
            _ => None,
        }
    }
}
