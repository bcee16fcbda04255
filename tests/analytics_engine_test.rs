use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::Arc;

use wealthlens_core::attribution::{
    AssetClassMap, AttributionService, AttributionServiceTrait, ContributionLevel,
};
use wealthlens_core::batch::{BatchService, BatchServiceTrait, CancellationFlag};
use wealthlens_core::benchmark::{
    BenchmarkComponent, BenchmarkDefinition, BenchmarkService, BenchmarkServiceTrait,
    InstrumentReturnSourceTrait, RebalancePolicy,
};
use wealthlens_core::cashflow::{CashFlowClassifier, CashFlowEvent, CashFlowKind};
use wealthlens_core::errors::Result;
use wealthlens_core::performance::rolling_calculator;
use wealthlens_core::performance::{ReturnMethod, ReturnService, ReturnServiceTrait};
use wealthlens_core::risk::RiskService;
use wealthlens_core::valuation::EntityRef;

mod common;
use common::{date, usd, InMemoryCashFlowSource, InMemoryValuationSource};

fn d(day: u32) -> NaiveDate {
    date(2024, 1, day)
}

/// Nine-day account with a deposit and a withdrawal mid-period.
fn flowing_account() -> (EntityRef, ReturnService) {
    let entity = EntityRef::account("FLOW");
    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(
        &entity,
        vec![
            (d(1), dec!(1000)),
            (d(2), dec!(1015)),
            (d(3), dec!(990)),
            (d(4), dec!(1200)),
            (d(5), dec!(1180)),
            (d(6), dec!(1210)),
            (d(7), dec!(1150)),
            (d(8), dec!(1190)),
            (d(9), dec!(1240)),
        ],
    );
    let mut flows = InMemoryCashFlowSource::new();
    flows.add_event(
        &entity,
        CashFlowEvent::new(d(4), usd(dec!(200)), CashFlowKind::Deposit),
    );
    flows.add_event(
        &entity,
        CashFlowEvent::new(d(7), usd(dec!(50)), CashFlowKind::Withdrawal),
    );
    let service = ReturnService::new(
        Arc::new(valuations),
        Arc::new(flows),
        CashFlowClassifier::default(),
    );
    (entity, service)
}

/// Account whose wealth index follows the reference drawdown path.
fn drawdown_account() -> (EntityRef, ReturnService) {
    let entity = EntityRef::account("DRAW");
    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(
        &entity,
        vec![
            (d(1), dec!(1000)),
            (d(2), dec!(1010)),
            (d(3), dec!(989.8)),
            (d(4), dec!(1004.647)),
            (d(5), dec!(999.623765)),
            (d(6), dec!(1019.6162403)),
        ],
    );
    let service = ReturnService::new(
        Arc::new(valuations),
        Arc::new(InMemoryCashFlowSource::new()),
        CashFlowClassifier::default(),
    );
    (entity, service)
}

#[test]
fn linking_subperiods_equals_linking_daily() {
    let (entity, service) = flowing_account();

    let full = service
        .period_performance(&entity, d(1), d(9), "USD", ReturnMethod::TimeWeighted)
        .unwrap();
    let first_half = service
        .period_performance(&entity, d(1), d(5), "USD", ReturnMethod::TimeWeighted)
        .unwrap();
    let second_half = service
        .period_performance(&entity, d(5), d(9), "USD", ReturnMethod::TimeWeighted)
        .unwrap();

    let relinked = (Decimal::ONE + first_half.value) * (Decimal::ONE + second_half.value)
        - Decimal::ONE;
    assert!(
        (relinked - full.value).abs() < dec!(0.00001),
        "relinked {} vs full {}",
        relinked,
        full.value
    );
}

#[test]
fn zero_flow_twr_equals_simple_return() {
    let entity = EntityRef::account("NOFLOW");
    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(
        &entity,
        vec![
            (d(1), dec!(2000)),
            (d(2), dec!(2040)),
            (d(3), dec!(1980)),
            (d(4), dec!(2100)),
        ],
    );
    let service = ReturnService::new(
        Arc::new(valuations),
        Arc::new(InMemoryCashFlowSource::new()),
        CashFlowClassifier::default(),
    );

    let perf = service
        .period_performance(&entity, d(1), d(4), "USD", ReturnMethod::TimeWeighted)
        .unwrap();
    // (2100 - 2000) / 2000
    assert!((perf.value - dec!(0.05)).abs() < dec!(0.000001));
}

#[test]
fn start_boundary_flow_leaves_both_methods_equal() {
    let entity = EntityRef::account("BOUNDARY");
    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(&entity, vec![(d(1), dec!(1500)), (d(11), dec!(1650))]);
    let mut flows = InMemoryCashFlowSource::new();
    // Dated on the period's first valuation day: already inside BMV.
    flows.add_event(
        &entity,
        CashFlowEvent::new(d(1), usd(dec!(500)), CashFlowKind::Deposit),
    );
    let valuations = Arc::new(valuations);
    let flows = Arc::new(flows);

    let service = ReturnService::new(valuations, flows, CashFlowClassifier::default());
    let twr = service
        .period_performance(&entity, d(1), d(11), "USD", ReturnMethod::TimeWeighted)
        .unwrap();
    let dietz = service
        .period_performance(&entity, d(1), d(11), "USD", ReturnMethod::ModifiedDietz)
        .unwrap();

    assert_eq!(twr.value, dec!(0.1));
    assert_eq!(dietz.value, dec!(0.1));
    assert_eq!(twr.net_flows.amount(), Decimal::ZERO);
}

#[test]
fn risk_card_matches_reference_wealth_path() {
    let (entity, service) = drawdown_account();
    let daily = service.daily_returns(&entity, d(1), d(6), "USD").unwrap();
    let values: Vec<Decimal> = daily.iter().map(|r| r.value).collect();
    assert_eq!(
        values,
        vec![dec!(0.01), dec!(-0.02), dec!(0.015), dec!(-0.005), dec!(0.02)]
    );

    let card = RiskService::default().risk_card(&daily, None);
    assert_eq!(card.max_drawdown, dec!(-0.02));
    assert_eq!(card.peak_date, Some(d(2)));
    assert_eq!(card.trough_date, Some(d(3)));
    assert!(card.max_drawdown >= dec!(-1) && card.max_drawdown <= Decimal::ZERO);
    assert_eq!(card.hit_rate_daily, dec!(0.6));
    assert!(card.trough_date >= card.peak_date);
}

#[test]
fn contributions_sum_near_portfolio_return() {
    let portfolio = EntityRef::portfolio("GROWTH");
    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(
        &portfolio,
        vec![(d(1), dec!(1000)), (d(2), dec!(1023)), (d(3), dec!(1052))],
    );
    valuations.add_totals(
        &portfolio.with_security("AAPL"),
        vec![(d(1), dec!(400)), (d(2), dec!(420)), (d(3), dec!(440))],
    );
    valuations.add_totals(
        &portfolio.with_security("AGG"),
        vec![(d(1), dec!(600)), (d(2), dec!(603)), (d(3), dec!(612))],
    );
    valuations.set_constituents(&portfolio, vec!["AAPL", "AGG"]);
    let valuations = Arc::new(valuations);
    let flows = Arc::new(InMemoryCashFlowSource::new());

    let attribution = AttributionService::new(
        valuations.clone(),
        flows.clone(),
        CashFlowClassifier::default(),
        AssetClassMap::default(),
    );
    let returns = ReturnService::new(valuations, flows, CashFlowClassifier::default());

    let records = attribution
        .contributions(&portfolio, d(1), d(3), "USD", ContributionLevel::Security)
        .unwrap();
    let perf = returns
        .period_performance(&portfolio, d(1), d(3), "USD", ReturnMethod::TimeWeighted)
        .unwrap();

    let contribution_sum: Decimal = records.iter().map(|r| r.contribution).sum();
    // First-order decomposition: within 50 bps of the linked total.
    assert!(
        (contribution_sum - perf.value).abs() < dec!(0.005),
        "contributions {} vs portfolio {}",
        contribution_sum,
        perf.value
    );
}

#[test]
fn rolling_since_inception_matches_period_performance() {
    let (entity, service) = flowing_account();
    let daily = service.daily_returns(&entity, d(1), d(9), "USD").unwrap();
    let perf = service
        .period_performance(&entity, d(1), d(9), "USD", ReturnMethod::TimeWeighted)
        .unwrap();

    let rolling = rolling_calculator::rolling_returns(&daily, d(9), d(1));
    assert!(
        (rolling.since_inception - perf.value).abs() < dec!(0.0001),
        "rolling {} vs period {}",
        rolling.since_inception,
        perf.value
    );
}

struct InMemoryInstrumentReturns {
    returns: HashMap<(String, NaiveDate), Decimal>,
}

impl InstrumentReturnSourceTrait for InMemoryInstrumentReturns {
    fn get_daily_return(&self, instrument_id: &str, date: NaiveDate) -> Result<Option<Decimal>> {
        Ok(self
            .returns
            .get(&(instrument_id.to_string(), date))
            .copied())
    }
}

#[test]
fn benchmark_tracks_portfolio_with_full_correlation() {
    let (entity, service) = drawdown_account();
    let daily = service.daily_returns(&entity, d(1), d(6), "USD").unwrap();

    let returns: HashMap<(String, NaiveDate), Decimal> = daily
        .iter()
        .map(|r| (("TRACKER".to_string(), r.return_date), r.value))
        .collect();
    let benchmark_service =
        BenchmarkService::new(Arc::new(InMemoryInstrumentReturns { returns }));
    let definition = BenchmarkDefinition {
        name: "TRACKER_100".to_string(),
        reporting_currency: "USD".to_string(),
        components: vec![BenchmarkComponent {
            instrument_id: "TRACKER".to_string(),
            weight: dec!(1.0),
        }],
        rebalance_policy: RebalancePolicy::Daily,
    };

    let benchmark = benchmark_service
        .benchmark_returns(&definition, d(2), d(6))
        .unwrap();
    assert_eq!(benchmark.len(), daily.len());

    let card = RiskService::default().risk_card(&daily, Some(&benchmark));
    let correlation = card.correlation_to_benchmark.unwrap();
    assert!((correlation - dec!(1)).abs() < dec!(0.0001));
}

#[tokio::test]
async fn batch_matches_individual_computation() {
    let flow_entity = EntityRef::account("FLOW");
    let draw_entity = EntityRef::account("DRAW");

    let mut valuations = InMemoryValuationSource::new();
    valuations.add_totals(
        &flow_entity,
        vec![(d(1), dec!(1000)), (d(2), dec!(1015)), (d(3), dec!(990))],
    );
    valuations.add_totals(
        &draw_entity,
        vec![(d(1), dec!(500)), (d(2), dec!(505)), (d(3), dec!(500))],
    );
    let service = Arc::new(ReturnService::new(
        Arc::new(valuations),
        Arc::new(InMemoryCashFlowSource::new()),
        CashFlowClassifier::default(),
    ));

    let batch = BatchService::new(service.clone());
    let results = batch
        .daily_returns_for_entities(
            vec![flow_entity.clone(), draw_entity.clone()],
            d(1),
            d(3),
            "USD".to_string(),
            CancellationFlag::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        results[0],
        service.daily_returns(&flow_entity, d(1), d(3), "USD").unwrap()
    );
    assert_eq!(
        results[1],
        service.daily_returns(&draw_entity, d(1), d(3), "USD").unwrap()
    );
}
