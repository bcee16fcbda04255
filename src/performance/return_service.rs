use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::ops::Bound;
use std::sync::Arc;

use crate::cashflow::{CashFlowClassifier, CashFlowSourceTrait};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::money::{validate_currency_code, Money};
use crate::performance::performance_model::{
    DailyReturn, PeriodPerformance, ReturnData, ReturnMethod,
};
use crate::performance::return_calculator;
use crate::utils::cancellation::CancellationFlag;
use crate::valuation::{validate_series, EntityRef, ValuationPoint, ValuationSourceTrait};

pub trait ReturnServiceTrait: Send + Sync {
    /// Daily time-weighted returns for the entity over `[start, end]`, in
    /// ascending date order. Days the entity cannot be valued on are absent.
    fn daily_returns(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Vec<DailyReturn>>;

    /// Same as `daily_returns`, aborting with `Error::Cancelled` when the
    /// flag trips between date iterations.
    fn daily_returns_cancellable(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        cancel: &CancellationFlag,
    ) -> Result<Vec<DailyReturn>>;

    /// Period return under the requested methodology. Callers cross-check by
    /// requesting both methods for the same period.
    fn period_performance(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        method: ReturnMethod,
    ) -> Result<PeriodPerformance>;
}

pub struct ReturnService {
    valuation_source: Arc<dyn ValuationSourceTrait>,
    cashflow_source: Arc<dyn CashFlowSourceTrait>,
    classifier: CashFlowClassifier,
}

impl ReturnService {
    pub fn new(
        valuation_source: Arc<dyn ValuationSourceTrait>,
        cashflow_source: Arc<dyn CashFlowSourceTrait>,
        classifier: CashFlowClassifier,
    ) -> Self {
        Self {
            valuation_source,
            cashflow_source,
            classifier,
        }
    }

    fn validate_request(
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<()> {
        if start > end {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Start date must be before end date".to_string(),
            )));
        }
        validate_currency_code(reporting_currency)
    }

    fn fetch_series(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Vec<ValuationPoint>> {
        let series =
            self.valuation_source
                .get_valuation_range(entity, start, end, reporting_currency)?;
        validate_series(&series, reporting_currency)?;
        for point in &series {
            if point.total_value.amount().is_sign_negative() {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Negative total value for {} on {}",
                    entity, point.valuation_date
                ))));
            }
        }
        Ok(series)
    }

    /// Net signed external flows per date over the resolved series range.
    fn fetch_flows(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<std::collections::BTreeMap<NaiveDate, Decimal>> {
        let events = self.cashflow_source.get_external_flows(entity, start, end)?;
        self.classifier
            .net_external_by_date(&events, reporting_currency)
    }

    fn empty_performance(
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        method: ReturnMethod,
    ) -> Result<PeriodPerformance> {
        let zero = Money::zero(reporting_currency)?;
        Ok(PeriodPerformance {
            id: Self::performance_id(entity, start, end, method),
            entity: entity.clone(),
            period_start: start,
            period_end: end,
            reporting_currency: reporting_currency.to_string(),
            method,
            value: Decimal::ZERO,
            annualized: Decimal::ZERO,
            beginning_value: zero.clone(),
            ending_value: zero.clone(),
            net_flows: zero.clone(),
            gain_loss_amount: zero.clone(),
            income: zero,
            returns: Vec::new(),
        })
    }

    fn performance_id(
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        method: ReturnMethod,
    ) -> String {
        format!("{}_{}_{}_{}", entity, start, end, method.as_str())
    }
}

impl ReturnServiceTrait for ReturnService {
    fn daily_returns(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Vec<DailyReturn>> {
        self.daily_returns_cancellable(
            entity,
            start,
            end,
            reporting_currency,
            &CancellationFlag::new(),
        )
    }

    fn daily_returns_cancellable(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        cancel: &CancellationFlag,
    ) -> Result<Vec<DailyReturn>> {
        Self::validate_request(start, end, reporting_currency)?;

        let series = self.fetch_series(entity, start, end, reporting_currency)?;
        if series.len() < 2 {
            warn!(
                "Daily returns for '{}': not enough valuation data ({} points)",
                entity,
                series.len()
            );
            return Ok(Vec::new());
        }

        let first_date = series[0].valuation_date;
        let last_date = series[series.len() - 1].valuation_date;
        let flows_by_date =
            self.fetch_flows(entity, first_date, last_date, reporting_currency)?;

        let mut returns = Vec::with_capacity(series.len() - 1);
        for window in series.windows(2) {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled(format!("daily returns for {}", entity)));
            }
            let prev = &window[0];
            let curr = &window[1];
            let net_flow: Decimal = flows_by_date
                .range((
                    Bound::Excluded(prev.valuation_date),
                    Bound::Included(curr.valuation_date),
                ))
                .map(|(_, amount)| *amount)
                .sum();
            let value = return_calculator::daily_return(
                prev.total_value.amount(),
                curr.total_value.amount(),
                net_flow,
            );
            returns.push(DailyReturn {
                return_date: curr.valuation_date,
                entity: entity.clone(),
                reporting_currency: reporting_currency.to_string(),
                value: value.round_dp(DECIMAL_PRECISION),
            });
        }

        Ok(returns)
    }

    fn period_performance(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        method: ReturnMethod,
    ) -> Result<PeriodPerformance> {
        Self::validate_request(start, end, reporting_currency)?;

        let series = self.fetch_series(entity, start, end, reporting_currency)?;
        if series.len() < 2 {
            warn!(
                "Period performance for '{}': not enough valuation data ({} points)",
                entity,
                series.len()
            );
            return Self::empty_performance(entity, start, end, reporting_currency, method);
        }

        let start_point = &series[0];
        let end_point = &series[series.len() - 1];
        let actual_start = start_point.valuation_date;
        let actual_end = end_point.valuation_date;

        let flows_by_date =
            self.fetch_flows(entity, actual_start, actual_end, reporting_currency)?;

        // Flows dated on the period's first valuation day are already inside
        // the beginning value; only flows after it move the period.
        let period_flows: Vec<(NaiveDate, Decimal)> = flows_by_date
            .range((Bound::Excluded(actual_start), Bound::Included(actual_end)))
            .map(|(date, amount)| (*date, *amount))
            .collect();
        let net_flow_total: Decimal = period_flows.iter().map(|(_, a)| *a).sum();

        let bmv = start_point.total_value.amount();
        let emv = end_point.total_value.amount();

        let (value, returns) = match method {
            ReturnMethod::TimeWeighted => {
                let values: Vec<(NaiveDate, Decimal)> = series
                    .iter()
                    .map(|p| (p.valuation_date, p.total_value.amount()))
                    .collect();
                let daily =
                    return_calculator::daily_returns_from_values(&values, &flows_by_date);

                let mut cumulative = Decimal::ONE;
                let mut returns = Vec::with_capacity(series.len());
                returns.push(ReturnData {
                    date: actual_start,
                    value: Decimal::ZERO,
                });
                for (date, r) in &daily {
                    cumulative *= Decimal::ONE + *r;
                    returns.push(ReturnData {
                        date: *date,
                        value: (cumulative - Decimal::ONE).round_dp(DECIMAL_PRECISION),
                    });
                }
                (cumulative - Decimal::ONE, returns)
            }
            ReturnMethod::ModifiedDietz => {
                let value = return_calculator::modified_dietz(
                    bmv,
                    emv,
                    &period_flows,
                    actual_start,
                    actual_end,
                );
                (value, Vec::new())
            }
        };

        let annualized = return_calculator::annualized_return(actual_start, actual_end, value);
        let net_flows = Money::new(net_flow_total, reporting_currency)?;
        let gain_loss = Money::new(emv - bmv - net_flow_total, reporting_currency)?;
        // Income on the anchor day belongs to the prior period, like flows.
        let income_total: Decimal = series
            .iter()
            .skip(1)
            .map(|p| p.income_for_day.amount())
            .sum();
        let income = Money::new(income_total, reporting_currency)?;

        Ok(PeriodPerformance {
            id: Self::performance_id(entity, actual_start, actual_end, method),
            entity: entity.clone(),
            period_start: actual_start,
            period_end: actual_end,
            reporting_currency: reporting_currency.to_string(),
            method,
            value: value.round_dp(DECIMAL_PRECISION),
            annualized: annualized.round_dp(DECIMAL_PRECISION),
            beginning_value: start_point.total_value.round_dp(DECIMAL_PRECISION),
            ending_value: end_point.total_value.round_dp(DECIMAL_PRECISION),
            net_flows: net_flows.round_dp(DECIMAL_PRECISION),
            gain_loss_amount: gain_loss.round_dp(DECIMAL_PRECISION),
            income: income.round_dp(DECIMAL_PRECISION),
            returns,
        })
    }
}
