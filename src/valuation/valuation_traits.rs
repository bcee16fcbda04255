use chrono::NaiveDate;

use crate::errors::Result;
use crate::valuation::{EntityRef, ValuationPoint};

/// Read-only access to the daily valuation series maintained by the external
/// valuation generator.
pub trait ValuationSourceTrait: Send + Sync {
    /// The entity's close-of-day valuation, or `None` when the entity cannot
    /// be valued on that date.
    fn get_valuation(
        &self,
        entity: &EntityRef,
        date: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Option<ValuationPoint>>;

    /// All valuation points in `[start, end]`, ascending by date. Days the
    /// entity cannot be valued on are simply absent from the result.
    fn get_valuation_range(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
        reporting_currency: &str,
    ) -> Result<Vec<ValuationPoint>>;

    /// Security symbols held by the entity at the close of `date`.
    fn get_constituents(&self, entity: &EntityRef, date: NaiveDate) -> Result<Vec<String>>;
}
