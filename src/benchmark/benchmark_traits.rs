use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;

/// Close-to-close daily price returns for benchmark component instruments,
/// supplied by the external market-data layer.
pub trait InstrumentReturnSourceTrait: Send + Sync {
    /// The instrument's fractional price return for `date`, or `None` when no
    /// quote exists for that day.
    fn get_daily_return(&self, instrument_id: &str, date: NaiveDate) -> Result<Option<Decimal>>;
}
