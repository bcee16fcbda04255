use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::benchmark::{BenchmarkDefinition, InstrumentReturnSourceTrait};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::performance::DailyReturn;
use crate::utils::time_utils::get_days_between;
use crate::valuation::EntityRef;

pub trait BenchmarkServiceTrait: Send + Sync {
    /// Daily return series of the synthetic benchmark over `[start, end]`,
    /// each day a weighted sum of component price returns. The benchmark is
    /// rebalanced back to target weights every day; rebalancing costs and
    /// taxes are ignored.
    fn benchmark_returns(
        &self,
        definition: &BenchmarkDefinition,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyReturn>>;
}

pub struct BenchmarkService {
    return_source: Arc<dyn InstrumentReturnSourceTrait>,
}

impl BenchmarkService {
    pub fn new(return_source: Arc<dyn InstrumentReturnSourceTrait>) -> Self {
        Self { return_source }
    }
}

impl BenchmarkServiceTrait for BenchmarkService {
    fn benchmark_returns(
        &self,
        definition: &BenchmarkDefinition,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyReturn>> {
        if start > end {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Start date must be before end date".to_string(),
            )));
        }
        definition.validate()?;

        let entity = EntityRef::benchmark(&definition.name);
        let mut returns = Vec::new();

        for date in get_days_between(start, end) {
            let mut weighted_return = Decimal::ZERO;
            let mut complete = true;
            for component in &definition.components {
                match self
                    .return_source
                    .get_daily_return(&component.instrument_id, date)?
                {
                    Some(component_return) => {
                        weighted_return += component.weight * component_return;
                    }
                    None => {
                        complete = false;
                        break;
                    }
                }
            }

            // A day any component cannot price is skipped, like a day the
            // portfolio cannot be valued.
            if !complete {
                debug!(
                    "Benchmark '{}': missing component return on {}, skipping day",
                    definition.name, date
                );
                continue;
            }

            returns.push(DailyReturn {
                return_date: date,
                entity: entity.clone(),
                reporting_currency: definition.reporting_currency.clone(),
                value: weighted_return.round_dp(DECIMAL_PRECISION),
            });
        }

        Ok(returns)
    }
}
