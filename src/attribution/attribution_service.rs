use chrono::NaiveDate;
use log::warn;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::attribution::{AssetClassMap, ContributionLevel, ContributionRecord};
use crate::cashflow::{CashFlowClassifier, CashFlowSourceTrait};
use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::money::validate_currency_code;
use crate::performance::return_calculator::{daily_returns_from_values, link_returns};
use crate::valuation::{EntityRef, ValuationSourceTrait};

pub trait AttributionServiceTrait: Send + Sync {
    /// Decomposes the entity's period return into per-key contributions
    /// using start-of-period weights. Keys opened during the period are
    /// excluded; they enter attribution the first period that starts on or
    /// after their opening date.
    fn contributions(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        level: ContributionLevel,
    ) -> Result<Vec<ContributionRecord>>;
}

pub struct AttributionService {
    valuation_source: Arc<dyn ValuationSourceTrait>,
    cashflow_source: Arc<dyn CashFlowSourceTrait>,
    classifier: CashFlowClassifier,
    asset_classes: AssetClassMap,
}

impl AttributionService {
    pub fn new(
        valuation_source: Arc<dyn ValuationSourceTrait>,
        cashflow_source: Arc<dyn CashFlowSourceTrait>,
        classifier: CashFlowClassifier,
        asset_classes: AssetClassMap,
    ) -> Self {
        Self {
            valuation_source,
            cashflow_source,
            classifier,
            asset_classes,
        }
    }

    /// Start value, dated total-value series and net external flows for one
    /// sliced entity. `None` when the slice has no valuation at `start`,
    /// which is how mid-period openings are excluded.
    fn key_inputs(
        &self,
        sub_entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Option<(Decimal, Vec<(NaiveDate, Decimal)>, BTreeMap<NaiveDate, Decimal>)>> {
        let series = self.valuation_source.get_valuation_range(
            sub_entity,
            start,
            end,
            reporting_currency,
        )?;
        let opens_at_start = series
            .first()
            .map(|p| p.valuation_date == start)
            .unwrap_or(false);
        if !opens_at_start {
            return Ok(None);
        }

        let values: Vec<(NaiveDate, Decimal)> = series
            .iter()
            .map(|p| (p.valuation_date, p.total_value.amount()))
            .collect();
        let events = self
            .cashflow_source
            .get_external_flows(sub_entity, start, end)?;
        let flows = self
            .classifier
            .net_external_by_date(&events, reporting_currency)?;
        Ok(Some((values[0].1, values, flows)))
    }

    /// (start value, linked return) per security symbol held at `start`.
    fn security_inputs(
        &self,
        entity: &EntityRef,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<BTreeMap<String, (Decimal, Decimal)>> {
        let mut inputs = BTreeMap::new();
        for symbol in symbols {
            let sub_entity = entity.with_security(symbol);
            match self.key_inputs(&sub_entity, start, end, reporting_currency)? {
                Some((start_value, values, flows)) => {
                    let daily = daily_returns_from_values(&values, &flows);
                    let linked = link_returns(daily.into_iter().map(|(_, r)| r));
                    inputs.insert(symbol.clone(), (start_value, linked));
                }
                None => {
                    warn!(
                        "Attribution for '{}': security '{}' has no valuation at {}, excluding",
                        entity, symbol, start
                    );
                }
            }
        }
        Ok(inputs)
    }

    /// (start value, linked return) per asset class, aggregating member
    /// securities through the injected class mapping.
    fn asset_class_inputs(
        &self,
        entity: &EntityRef,
        symbols: &[String],
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<BTreeMap<String, (Decimal, Decimal)>> {
        let mut members: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        for symbol in symbols {
            members
                .entry(self.asset_classes.class_for(symbol).to_string())
                .or_default()
                .push(symbol);
        }

        let mut inputs = BTreeMap::new();
        for (class, class_symbols) in members {
            let mut values_by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
            let mut flows_by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
            let mut member_count = 0;

            for symbol in class_symbols {
                let sub_entity = entity.with_security(symbol);
                match self.key_inputs(&sub_entity, start, end, reporting_currency)? {
                    Some((_, values, flows)) => {
                        member_count += 1;
                        for (date, amount) in values {
                            *values_by_date.entry(date).or_insert(Decimal::ZERO) += amount;
                        }
                        for (date, amount) in flows {
                            *flows_by_date.entry(date).or_insert(Decimal::ZERO) += amount;
                        }
                    }
                    None => {
                        warn!(
                            "Attribution for '{}': security '{}' has no valuation at {}, excluding",
                            entity, symbol, start
                        );
                    }
                }
            }

            if member_count == 0 {
                continue;
            }

            let start_value = values_by_date
                .get(&start)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let values: Vec<(NaiveDate, Decimal)> = values_by_date.into_iter().collect();
            let daily = daily_returns_from_values(&values, &flows_by_date);
            let linked = link_returns(daily.into_iter().map(|(_, r)| r));
            inputs.insert(class, (start_value, linked));
        }
        Ok(inputs)
    }
}

impl AttributionServiceTrait for AttributionService {
    fn contributions(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
        level: ContributionLevel,
    ) -> Result<Vec<ContributionRecord>> {
        if start > end {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Start date must be before end date".to_string(),
            )));
        }
        validate_currency_code(reporting_currency)?;

        let total_point =
            match self
                .valuation_source
                .get_valuation(entity, start, reporting_currency)?
            {
                Some(point) => point,
                None => {
                    warn!(
                        "Attribution for '{}': no valuation at {}, nothing to attribute",
                        entity, start
                    );
                    return Ok(Vec::new());
                }
            };
        let total_start = total_point.total_value.amount();

        let symbols = self.valuation_source.get_constituents(entity, start)?;
        if symbols.is_empty() {
            warn!(
                "Attribution for '{}': no constituents at {}, nothing to attribute",
                entity, start
            );
            return Ok(Vec::new());
        }

        let inputs = match level {
            ContributionLevel::Security => {
                self.security_inputs(entity, &symbols, start, end, reporting_currency)?
            }
            ContributionLevel::AssetClass => {
                self.asset_class_inputs(entity, &symbols, start, end, reporting_currency)?
            }
        };

        let records = inputs
            .into_iter()
            .map(|(key, (start_value, linked))| {
                let start_weight = if total_start.is_zero() {
                    Decimal::ZERO
                } else {
                    start_value / total_start
                };
                let contribution = start_weight * linked;
                ContributionRecord {
                    id: format!(
                        "{}_{}_{}_{}_{}",
                        entity,
                        start,
                        end,
                        level.as_str(),
                        key
                    ),
                    entity: entity.clone(),
                    period_start: start,
                    period_end: end,
                    reporting_currency: reporting_currency.to_string(),
                    level,
                    key,
                    start_weight: start_weight.round_dp(DECIMAL_PRECISION),
                    value: linked.round_dp(DECIMAL_PRECISION),
                    contribution: contribution.round_dp(DECIMAL_PRECISION),
                }
            })
            .collect();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cashflow::CashFlowEvent;
    use crate::money::Money;
    use crate::valuation::ValuationPoint;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    struct MockSources {
        series: HashMap<EntityRef, Vec<ValuationPoint>>,
        constituents: Vec<String>,
    }

    impl MockSources {
        fn new(constituents: Vec<&str>) -> Self {
            MockSources {
                series: HashMap::new(),
                constituents: constituents.into_iter().map(String::from).collect(),
            }
        }

        fn with_totals(
            mut self,
            entity: &EntityRef,
            points: Vec<(NaiveDate, Decimal)>,
        ) -> Self {
            let series = points
                .into_iter()
                .map(|(date, total)| {
                    ValuationPoint::new(
                        entity.clone(),
                        date,
                        "USD",
                        Money::new(total, "USD").unwrap(),
                        Money::new(total, "USD").unwrap(),
                        Money::zero("USD").unwrap(),
                        Money::zero("USD").unwrap(),
                    )
                    .unwrap()
                })
                .collect();
            self.series.insert(entity.clone(), series);
            self
        }
    }

    impl ValuationSourceTrait for MockSources {
        fn get_valuation(
            &self,
            entity: &EntityRef,
            date: NaiveDate,
            _reporting_currency: &str,
        ) -> Result<Option<ValuationPoint>> {
            Ok(self.series.get(entity).and_then(|points| {
                points.iter().find(|p| p.valuation_date == date).cloned()
            }))
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

        fn get_constituents(&self, _entity: &EntityRef, _date: NaiveDate) -> Result<Vec<String>> {
            Ok(self.constituents.clone())
        }
    }

    struct NoFlows;

    impl CashFlowSourceTrait for NoFlows {
        fn get_external_flows(
            &self,
            _entity: &EntityRef,
            _start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<CashFlowEvent>> {
            Ok(Vec::new())
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn service(sources: MockSources, classes: Vec<(&str, &str)>) -> AttributionService {
        let map = AssetClassMap::new(
            classes
                .into_iter()
                .map(|(s, c)| (s.to_string(), c.to_string()))
                .collect(),
        );
        AttributionService::new(
            Arc::new(sources),
            Arc::new(NoFlows),
            CashFlowClassifier::default(),
            map,
        )
    }

    #[test]
    fn contribution_is_weight_times_return() {
        let portfolio = EntityRef::portfolio("P1");
        // AAPL: 40% weight, +5%. AGG: 60% weight, flat.
        let sources = MockSources::new(vec!["AAPL", "AGG"])
            .with_totals(&portfolio, vec![(d(1), dec!(1000)), (d(30), dec!(1020))])
            .with_totals(
                &portfolio.with_security("AAPL"),
                vec![(d(1), dec!(400)), (d(30), dec!(420))],
            )
            .with_totals(
                &portfolio.with_security("AGG"),
                vec![(d(1), dec!(600)), (d(30), dec!(600))],
            );
        let service = service(sources, vec![]);

        let records = service
            .contributions(&portfolio, d(1), d(30), "USD", ContributionLevel::Security)
            .unwrap();
        assert_eq!(records.len(), 2);

        let aapl = records.iter().find(|r| r.key == "AAPL").unwrap();
        assert_eq!(aapl.start_weight, dec!(0.4));
        assert_eq!(aapl.value, dec!(0.05));
        assert_eq!(aapl.contribution, dec!(0.02));

        let agg = records.iter().find(|r| r.key == "AGG").unwrap();
        assert_eq!(agg.contribution, Decimal::ZERO);
    }

    #[test]
    fn asset_class_level_aggregates_members() {
        let portfolio = EntityRef::portfolio("P1");
        let sources = MockSources::new(vec!["AAPL", "MSFT", "AGG"])
            .with_totals(&portfolio, vec![(d(1), dec!(1000)), (d(30), dec!(1050))])
            .with_totals(
                &portfolio.with_security("AAPL"),
                vec![(d(1), dec!(300)), (d(30), dec!(330))],
            )
            .with_totals(
                &portfolio.with_security("MSFT"),
                vec![(d(1), dec!(200)), (d(30), dec!(220))],
            )
            .with_totals(
                &portfolio.with_security("AGG"),
                vec![(d(1), dec!(500)), (d(30), dec!(500))],
            );
        let service = service(
            sources,
            vec![("AAPL", "Equity"), ("MSFT", "Equity"), ("AGG", "Bond")],
        );

        let records = service
            .contributions(&portfolio, d(1), d(30), "USD", ContributionLevel::AssetClass)
            .unwrap();
        assert_eq!(records.len(), 2);

        let equity = records.iter().find(|r| r.key == "Equity").unwrap();
        assert_eq!(equity.start_weight, dec!(0.5));
        // 500 -> 550 across both equities.
        assert_eq!(equity.value, dec!(0.1));
        assert_eq!(equity.contribution, dec!(0.05));

        let bond = records.iter().find(|r| r.key == "Bond").unwrap();
        assert_eq!(bond.contribution, Decimal::ZERO);
    }

    #[test]
    fn keys_opened_mid_period_are_excluded() {
        let portfolio = EntityRef::portfolio("P1");
        let sources = MockSources::new(vec!["AAPL", "NEWCO"])
            .with_totals(&portfolio, vec![(d(1), dec!(1000)), (d(30), dec!(1100))])
            .with_totals(
                &portfolio.with_security("AAPL"),
                vec![(d(1), dec!(1000)), (d(30), dec!(1050))],
            )
            .with_totals(
                &portfolio.with_security("NEWCO"),
                vec![(d(15), dec!(50)), (d(30), dec!(50))],
            );
        let service = service(sources, vec![]);

        let records = service
            .contributions(&portfolio, d(1), d(30), "USD", ContributionLevel::Security)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "AAPL");
    }

    #[test]
    fn zero_total_gives_zero_weights() {
        let portfolio = EntityRef::portfolio("P1");
        let sources = MockSources::new(vec!["AAPL"])
            .with_totals(&portfolio, vec![(d(1), dec!(0)), (d(30), dec!(0))])
            .with_totals(
                &portfolio.with_security("AAPL"),
                vec![(d(1), dec!(0)), (d(30), dec!(0))],
            );
        let service = service(sources, vec![]);

        let records = service
            .contributions(&portfolio, d(1), d(30), "USD", ContributionLevel::Security)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].start_weight, Decimal::ZERO);
        assert_eq!(records[0].contribution, Decimal::ZERO);
    }

    #[test]
    fn missing_start_valuation_yields_empty_attribution() {
        let portfolio = EntityRef::portfolio("P1");
        let service = service(MockSources::new(vec!["AAPL"]), vec![]);
        let records = service
            .contributions(&portfolio, d(1), d(30), "USD", ContributionLevel::Security)
            .unwrap();
        assert!(records.is_empty());
    }
}
