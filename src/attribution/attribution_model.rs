use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::constants::UNCLASSIFIED_ASSET_CLASS;
use crate::errors::Result;
use crate::valuation::EntityRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContributionLevel {
    Security,
    AssetClass,
}

impl ContributionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionLevel::Security => "security",
            ContributionLevel::AssetClass => "assetClass",
        }
    }
}

/// One key's share of a period return: start-of-period weight times the
/// key's own linked return. First-order, so the records for a period sum to
/// approximately (not exactly) the portfolio's linked return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    pub id: String,
    pub entity: EntityRef,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub reporting_currency: String,
    pub level: ContributionLevel,
    pub key: String,
    pub start_weight: Decimal,
    pub value: Decimal,
    pub contribution: Decimal,
}

/// Injected symbol-to-asset-class dictionary. Callers own the mapping
/// lifecycle; symbols it does not cover fall into the unclassified bucket.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetClassMap {
    classes: HashMap<String, String>,
}

impl AssetClassMap {
    pub fn new(classes: HashMap<String, String>) -> Self {
        AssetClassMap { classes }
    }

    /// Loads a `{"SYMBOL": "CLASS"}` JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let classes: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(AssetClassMap { classes })
    }

    pub fn class_for(&self, symbol: &str) -> &str {
        self.classes
            .get(symbol)
            .map(String::as_str)
            .unwrap_or(UNCLASSIFIED_ASSET_CLASS)
    }
}
