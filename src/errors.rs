use std::num::ParseFloatError;
use thiserror::Error;

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Currency operation failed: {0}")]
    Currency(#[from] CurrencyError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Engine configuration failed: {0}")]
    Config(#[from] ConfigError),

    #[error("Computation cancelled: {0}")]
    Cancelled(String),
}

#[derive(Error, Debug)]
pub enum CurrencyError {
    #[error("Cannot combine amounts denominated in '{0}' and '{1}' without conversion")]
    Mismatch(String, String),

    #[error("Currency '{0}' is not a valid 3-letter code")]
    InvalidCode(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),
}

#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Calculation error: {0}")]
    Calculation(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported rebalance policy '{0}'")]
    UnsupportedRebalancePolicy(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to load configuration: {0}")]
    IO(String),
}

// Add From implementation for rust_decimal::Error
impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

// Add From implementation for serde_json::Error
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(ConfigError::InvalidValue(err.to_string()))
    }
}
