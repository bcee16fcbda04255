use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{CurrencyError, Error, Result};

/// Checks that a currency code is a 3-letter uppercase ASCII code.
pub fn validate_currency_code(code: &str) -> Result<()> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(Error::Currency(CurrencyError::InvalidCode(code.to_string())));
    }
    Ok(())
}

/// An amount in a single currency.
///
/// Amounts in different currencies never combine implicitly; `checked_add` and
/// `checked_sub` fail with a currency mismatch instead of coercing. Conversion
/// between currencies is the caller's responsibility and happens before values
/// enter the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    amount: Decimal,
    currency: String,
}

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Result<Self> {
        validate_currency_code(currency)?;
        Ok(Money {
            amount,
            currency: currency.to_string(),
        })
    }

    pub fn zero(currency: &str) -> Result<Self> {
        Self::new(Decimal::ZERO, currency)
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn round_dp(&self, dp: u32) -> Money {
        Money {
            amount: self.amount.round_dp(dp),
            currency: self.currency.clone(),
        }
    }

    pub fn checked_add(&self, other: &Money) -> Result<Money> {
        self.ensure_currency(&other.currency)?;
        Ok(Money {
            amount: self.amount + other.amount,
            currency: self.currency.clone(),
        })
    }

    pub fn checked_sub(&self, other: &Money) -> Result<Money> {
        self.ensure_currency(&other.currency)?;
        Ok(Money {
            amount: self.amount - other.amount,
            currency: self.currency.clone(),
        })
    }

    /// Fails fast when this amount is not denominated in `currency`.
    pub fn ensure_currency(&self, currency: &str) -> Result<()> {
        if self.currency != currency {
            return Err(Error::Currency(CurrencyError::Mismatch(
                self.currency.clone(),
                currency.to_string(),
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
