//! Pure return arithmetic shared by the services: single-day returns,
//! geometric linking, Modified Dietz, and annualization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::ops::Bound;

use crate::constants::DAYS_PER_YEAR_DECIMAL;

/// Daily return with external flows neutralized:
/// `(EMV - CF - BMV) / BMV`, 0 when BMV is 0.
pub fn daily_return(bmv: Decimal, emv: Decimal, net_flow: Decimal) -> Decimal {
    if bmv.is_zero() {
        Decimal::ZERO
    } else {
        (emv - net_flow - bmv) / bmv
    }
}

/// Geometric linking: `Π(1 + r) - 1`.
pub fn link_returns<I>(returns: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let mut cumulative = Decimal::ONE;
    for r in returns {
        cumulative *= Decimal::ONE + r;
    }
    cumulative - Decimal::ONE
}

/// Daily returns from a dated value series and a net-external-flow-per-date
/// map. The first value is the anchor; each later value yields one return.
///
/// A calendar gap between consecutive points produces a single return
/// spanning the gap, with every flow dated inside `(prev, curr]` neutralized
/// in it, so excluded days never distort the linked total.
pub fn daily_returns_from_values(
    values: &[(NaiveDate, Decimal)],
    flows_by_date: &BTreeMap<NaiveDate, Decimal>,
) -> Vec<(NaiveDate, Decimal)> {
    let mut returns = Vec::with_capacity(values.len().saturating_sub(1));
    for window in values.windows(2) {
        let (prev_date, bmv) = window[0];
        let (curr_date, emv) = window[1];
        let net_flow: Decimal = flows_by_date
            .range((Bound::Excluded(prev_date), Bound::Included(curr_date)))
            .map(|(_, amount)| *amount)
            .sum();
        returns.push((curr_date, daily_return(bmv, emv, net_flow)));
    }
    returns
}

/// Modified Dietz period return. Flows are `(date, signed amount)` pairs in
/// `(start, end]`; a flow's weight is the fraction of the period it was
/// invested, `(D - d_i) / D`. Returns 0 when the denominator is 0.
pub fn modified_dietz(
    bmv: Decimal,
    emv: Decimal,
    flows: &[(NaiveDate, Decimal)],
    start: NaiveDate,
    end: NaiveDate,
) -> Decimal {
    let total_days = (end - start).num_days();

    let mut net_flows = Decimal::ZERO;
    let mut weighted_flows = Decimal::ZERO;
    for (flow_date, amount) in flows {
        net_flows += amount;
        if total_days > 0 {
            let days_elapsed = (*flow_date - start).num_days();
            let weight =
                Decimal::from(total_days - days_elapsed) / Decimal::from(total_days);
            weighted_flows += weight * amount;
        }
    }

    let denominator = bmv + weighted_flows;
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        (emv - bmv - net_flows) / denominator
    }
}

/// Annualized return over `[start, end]`. Periods shorter than one year are
/// returned as-is; total losses cap at -100%.
pub fn annualized_return(
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_return: Decimal,
) -> Decimal {
    if start_date > end_date {
        return Decimal::ZERO;
    }

    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }

    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return total_return;
    }

    let years = Decimal::from(days) / DAYS_PER_YEAR_DECIMAL;
    if years < Decimal::ONE {
        return total_return;
    }

    let base = Decimal::ONE + total_return;
    // Guards the powd call when total_return sits just above -1.0 and
    // precision pushes base to zero or below.
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }

    let exponent = Decimal::ONE / years;
    base.powd(exponent) - Decimal::ONE
}
