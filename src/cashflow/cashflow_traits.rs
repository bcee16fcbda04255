use chrono::NaiveDate;

use crate::cashflow::CashFlowEvent;
use crate::errors::Result;
use crate::valuation::EntityRef;

/// Access to the classified transaction ledger, restricted to external flow
/// kinds (deposits, withdrawals, fees, interest). Events are re-classified by
/// the engine anyway, so a source returning internal events is harmless.
pub trait CashFlowSourceTrait: Send + Sync {
    /// External flow events for the entity in `[start, end]`, inclusive.
    fn get_external_flows(
        &self,
        entity: &EntityRef,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<CashFlowEvent>>;
}
