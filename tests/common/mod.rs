use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;

use wealthlens_core::cashflow::{CashFlowEvent, CashFlowSourceTrait};
use wealthlens_core::errors::Result;
use wealthlens_core::money::Money;
use wealthlens_core::valuation::{EntityRef, ValuationPoint, ValuationSourceTrait};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn usd(amount: Decimal) -> Money {
    Money::new(amount, "USD").unwrap()
}

/// Materialized valuation series per entity, the shape the external
/// valuation generator hands the engine.
#[derive(Default)]
pub struct InMemoryValuationSource {
    series: HashMap<EntityRef, Vec<ValuationPoint>>,
    constituents: HashMap<EntityRef, Vec<String>>,
}

impl InMemoryValuationSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_totals(&mut self, entity: &EntityRef, points: Vec<(NaiveDate, Decimal)>) {
        let series = points
            .into_iter()
            .map(|(date, total)| {
                ValuationPoint::new(
                    entity.clone(),
                    date,
                    "USD",
                    usd(total),
                    usd(total),
                    usd(Decimal::ZERO),
                    usd(Decimal::ZERO),
                )
                .unwrap()
            })
            .collect();
        self.series.insert(entity.clone(), series);
    }

    pub fn set_constituents(&mut self, entity: &EntityRef, symbols: Vec<&str>) {
        self.constituents.insert(
            entity.clone(),
            symbols.into_iter().map(String::from).collect(),
        );
    }
}

impl ValuationSourceTrait for InMemoryValuationSource {
    fn get_valuation(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        _reporting_currency: &str,
    ) -> Result<Option<ValuationPoint>> {
        Ok(self
            .series
            .get(entity)
            .and_then(|points| points.iter().find(|p| p.valuation_date == date).cloned()))
    }

    fn get_valuation_range(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        _reporting_currency: &str,
    ) -> Result<Vec<ValuationPoint>> {
        Ok(self
            .series
            .get(entity)
            .map(|points| {
                points
                    .iter()
                    .filter(|p| p.valuation_date >= start && p.valuation_date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_constituents(&self, entity: &EntityRef, _date: NaiveDate) -> Result<Vec<String>> {
        Ok(self.constituents.get(entity).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct InMemoryCashFlowSource {
    events: HashMap<EntityRef, Vec<CashFlowEvent>>,
}

impl InMemoryCashFlowSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_event(&mut self, entity: &EntityRef, event: CashFlowEvent) {
        self.events.entry(entity.clone()).or_default().push(event);
    }
}

impl CashFlowSourceTrait for InMemoryCashFlowSource {
    fn get_external_flows(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CashFlowEvent>> {
        Ok(self
            .events
            .get(entity)
            .map(|events| {
                events
                    .iter()
                    .filter(|e| e.event_date >= start && e.event_date <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
