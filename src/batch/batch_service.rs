use async_trait::async_trait;
use chrono::NaiveDate;
use futures::future::join_all;
use log::debug;
use std::sync::Arc;

use crate::errors::{CalculatorError, Error, Result};
use crate::performance::{DailyReturn, PeriodPerformance, ReturnMethod, ReturnServiceTrait};
use crate::utils::cancellation::CancellationFlag;
use crate::valuation::EntityRef;

/// Fans the nightly recomputation out across independent entities.
///
/// Entities share no mutable state, so they run as concurrent tasks; within
/// one entity, dates are processed strictly in order by the underlying
/// service. A cancelled run fails as a whole so nothing partial reaches the
/// persistence layer.
#[async_trait]
pub trait BatchServiceTrait: Send + Sync {
    async fn daily_returns_for_entities(
        &self,
        entities: Vec<EntityRef>,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: String,
        cancel: CancellationFlag,
    ) -> Result<Vec<Vec<DailyReturn>>>;

    async fn period_performance_for_entities(
        &self,
        entities: Vec<EntityRef>,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: String,
        method: ReturnMethod,
    ) -> Result<Vec<PeriodPerformance>>;
}

pub struct BatchService {
    return_service: Arc<dyn ReturnServiceTrait>,
}

impl BatchService {
    pub fn new(return_service: Arc<dyn ReturnServiceTrait>) -> Self {
        Self { return_service }
    }
}

#[async_trait]
impl BatchServiceTrait for BatchService {
    async fn daily_returns_for_entities(
        &self,
        entities: Vec<EntityRef>,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: String,
        cancel: CancellationFlag,
    ) -> Result<Vec<Vec<DailyReturn>>> {
        debug!(
            "Computing daily returns for {} entities between {} and {}",
            entities.len(),
            start,
            end
        );

        let handles: Vec<_> = entities
            .into_iter()
            .map(|entity| {
                let service = Arc::clone(&self.return_service);
                let currency = reporting_currency.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    service.daily_returns_cancellable(&entity, start, end, &currency, &cancel)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            let result = joined.map_err(|e| {
                Error::Calculation(CalculatorError::Calculation(format!(
                    "Batch task failed: {}",
                    e
                )))
            })?;
            results.push(result?);
        }
        Ok(results)
    }

    async fn period_performance_for_entities(
        &self,
        entities: Vec<EntityRef>,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: String,
        method: ReturnMethod,
    ) -> Result<Vec<PeriodPerformance>> {
        let handles: Vec<_> = entities
            .into_iter()
            .map(|entity| {
                let service = Arc::clone(&self.return_service);
                let currency = reporting_currency.clone();
                tokio::spawn(async move {
                    service.period_performance(&entity, start, end, &currency, method)
                })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for joined in join_all(handles).await {
            let result = joined.map_err(|e| {
                Error::Calculation(CalculatorError::Calculation(format!(
                    "Batch task failed: {}",
                    e
                )))
            })?;
            results.push(result?);
        }
        Ok(results)
    }
}
