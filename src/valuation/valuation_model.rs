use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DECIMAL_PRECISION;
use crate::errors::{Error, Result, ValidationError};
use crate::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Account,
    Portfolio,
    Benchmark,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Account => "account",
            EntityKind::Portfolio => "portfolio",
            EntityKind::Benchmark => "benchmark",
        }
    }
}

/// Narrows an entity's valuation series to one slice of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Segment {
    AssetClass(String),
    Security(String),
}

/// Identifies the owner of a valuation or return series: an account, a
/// portfolio, or a synthetic benchmark, optionally narrowed to one slice.
///
/// References are ids only; resolving an account back to its portfolio is a
/// lookup the caller owns, never a pointer held here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
    pub segment: Option<Segment>,
}

impl EntityRef {
    pub fn account(id: &str) -> Self {
        EntityRef {
            kind: EntityKind::Account,
            id: id.to_string(),
            segment: None,
        }
    }

    pub fn portfolio(id: &str) -> Self {
        EntityRef {
            kind: EntityKind::Portfolio,
            id: id.to_string(),
            segment: None,
        }
    }

    pub fn benchmark(id: &str) -> Self {
        EntityRef {
            kind: EntityKind::Benchmark,
            id: id.to_string(),
            segment: None,
        }
    }

    pub fn with_security(&self, symbol: &str) -> Self {
        EntityRef {
            kind: self.kind,
            id: self.id.clone(),
            segment: Some(Segment::Security(symbol.to_string())),
        }
    }

    pub fn with_asset_class(&self, asset_class: &str) -> Self {
        EntityRef {
            kind: self.kind,
            id: self.id.clone(),
            segment: Some(Segment::AssetClass(asset_class.to_string())),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.id)?;
        match &self.segment {
            Some(Segment::Security(symbol)) => write!(f, "/sec:{}", symbol),
            Some(Segment::AssetClass(class)) => write!(f, "/class:{}", class),
            None => Ok(()),
        }
    }
}

/// One day's close-of-day valuation of an entity in one reporting currency.
///
/// Produced by the external valuation generator; this engine consumes the
/// series read-only. `total_value` must equal `securities_value + cash_value`
/// within rounding tolerance, and all four amounts must be denominated in the
/// reporting currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationPoint {
    pub id: String,
    pub entity: EntityRef,
    pub valuation_date: NaiveDate,
    pub reporting_currency: String,
    pub total_value: Money,
    pub securities_value: Money,
    pub cash_value: Money,
    pub income_for_day: Money,
}

impl ValuationPoint {
    pub fn new(
        entity: EntityRef,
        valuation_date: NaiveDate,
        reporting_currency: &str,
        total_value: Money,
        securities_value: Money,
        cash_value: Money,
        income_for_day: Money,
    ) -> Result<Self> {
        total_value.ensure_currency(reporting_currency)?;
        securities_value.ensure_currency(reporting_currency)?;
        cash_value.ensure_currency(reporting_currency)?;
        income_for_day.ensure_currency(reporting_currency)?;

        let tolerance = Decimal::new(1, DECIMAL_PRECISION);
        let parts_sum = securities_value.amount() + cash_value.amount();
        if (total_value.amount() - parts_sum).abs() > tolerance {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Valuation for {} on {}: total {} does not equal securities {} + cash {}",
                entity,
                valuation_date,
                total_value.amount(),
                securities_value.amount(),
                cash_value.amount()
            ))));
        }

        Ok(ValuationPoint {
            id: format!("{}_{}", entity, valuation_date),
            entity,
            valuation_date,
            reporting_currency: reporting_currency.to_string(),
            total_value,
            securities_value,
            cash_value,
            income_for_day,
        })
    }
}

/// Checks that a valuation series is strictly ascending by date and uniformly
/// denominated in `reporting_currency`.
pub fn validate_series(series: &[ValuationPoint], reporting_currency: &str) -> Result<()> {
    for point in series {
        point.total_value.ensure_currency(reporting_currency)?;
    }
    for window in series.windows(2) {
        if window[1].valuation_date <= window[0].valuation_date {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Valuation series is not ascending: {} follows {}",
                window[1].valuation_date, window[0].valuation_date
            ))));
        }
    }
    Ok(())
}
