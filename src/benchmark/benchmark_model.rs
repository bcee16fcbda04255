use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::{ConfigError, Error, Result, ValidationError};
use crate::money::validate_currency_code;

/// How the synthetic benchmark is brought back to target weights. Only daily
/// rebalancing is defined; configuration strings naming anything else are an
/// unsupported-configuration error, never silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RebalancePolicy {
    #[default]
    Daily,
}

impl RebalancePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RebalancePolicy::Daily => "DAILY",
        }
    }
}

impl FromStr for RebalancePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "DAILY" => Ok(RebalancePolicy::Daily),
            other => Err(Error::Config(ConfigError::UnsupportedRebalancePolicy(
                other.to_string(),
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComponent {
    pub instrument_id: String,
    pub weight: Decimal,
}

/// Fixed-weight synthetic benchmark. Weights need not sum to 1; any residual
/// is implied cash earning nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkDefinition {
    pub name: String,
    pub reporting_currency: String,
    pub components: Vec<BenchmarkComponent>,
    pub rebalance_policy: RebalancePolicy,
}

impl BenchmarkDefinition {
    pub fn validate(&self) -> Result<()> {
        validate_currency_code(&self.reporting_currency)?;
        if self.components.is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Benchmark '{}' has no components",
                self.name
            ))));
        }
        for component in &self.components {
            if component.weight.is_sign_negative() {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Benchmark '{}': component '{}' has negative weight {}",
                    self.name, component.instrument_id, component.weight
                ))));
            }
        }
        Ok(())
    }
}
