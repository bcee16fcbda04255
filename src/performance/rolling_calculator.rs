//! Trailing-window and calendar-month aggregation over a daily return
//! series. Windows predating available history clamp to the inception date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::constants::DECIMAL_PRECISION;
use crate::performance::performance_model::{
    DailyReturn, MonthlyReturn, MonthlyReturnTable, RollingReturnSet,
};
use crate::performance::return_calculator::link_returns;
use crate::utils::time_utils::{month_key, months_back, start_of_year, years_back};

/// Standard trailing windows as of `as_of`, linked from the daily series.
///
/// A window `[start, as_of]` measures growth from the close of `start`, so it
/// links the returns dated inside `(start, as_of]`; partitioning a period at
/// any boundary date therefore composes exactly.
pub fn rolling_returns(
    daily: &[DailyReturn],
    as_of: NaiveDate,
    inception_date: NaiveDate,
) -> RollingReturnSet {
    RollingReturnSet {
        as_of,
        one_month: window_return(daily, months_back(as_of, 1), as_of, inception_date),
        three_months: window_return(daily, months_back(as_of, 3), as_of, inception_date),
        six_months: window_return(daily, months_back(as_of, 6), as_of, inception_date),
        year_to_date: window_return(daily, start_of_year(as_of), as_of, inception_date),
        one_year: window_return(daily, years_back(as_of, 1), as_of, inception_date),
        three_years: window_return(daily, years_back(as_of, 3), as_of, inception_date),
        since_inception: window_return(daily, inception_date, as_of, inception_date),
    }
}

fn window_return(
    daily: &[DailyReturn],
    nominal_start: NaiveDate,
    as_of: NaiveDate,
    inception_date: NaiveDate,
) -> Decimal {
    let start = nominal_start.max(inception_date);
    if start >= as_of {
        return Decimal::ZERO;
    }
    let linked = link_returns(
        daily
            .iter()
            .filter(|r| r.return_date > start && r.return_date <= as_of)
            .map(|r| r.value),
    );
    linked.round_dp(DECIMAL_PRECISION)
}

/// Partitions the daily series into non-overlapping `(year, month)` buckets
/// and links within each bucket.
pub fn monthly_returns(daily: &[DailyReturn]) -> Vec<MonthlyReturn> {
    let mut buckets: BTreeMap<(i32, u32), Decimal> = BTreeMap::new();
    for r in daily {
        let growth = buckets.entry(month_key(r.return_date)).or_insert(Decimal::ONE);
        *growth *= Decimal::ONE + r.value;
    }
    buckets
        .into_iter()
        .map(|((year, month), growth)| MonthlyReturn {
            year,
            month,
            value: (growth - Decimal::ONE).round_dp(DECIMAL_PRECISION),
        })
        .collect()
}

/// Month-over-month table: one row per year, months in order, with the
/// year's return linked from its monthly buckets.
pub fn monthly_table(daily: &[DailyReturn]) -> Vec<MonthlyReturnTable> {
    let mut by_year: BTreeMap<i32, Vec<MonthlyReturn>> = BTreeMap::new();
    for month in monthly_returns(daily) {
        by_year.entry(month.year).or_default().push(month);
    }
    by_year
        .into_iter()
        .map(|(year, months)| {
            let year_to_date =
                link_returns(months.iter().map(|m| m.value)).round_dp(DECIMAL_PRECISION);
            MonthlyReturnTable {
                year,
                months,
                year_to_date,
            }
        })
        .collect()
}
