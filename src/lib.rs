pub mod constants;
pub mod errors;
pub mod money;
pub mod utils;

pub mod attribution;
pub mod batch;
pub mod benchmark;
pub mod cashflow;
pub mod costs;
pub mod performance;
pub mod risk;
pub mod valuation;

pub use errors::{Error, Result};
pub use money::Money;

pub use attribution::*;
pub use batch::*;
pub use benchmark::*;
pub use cashflow::*;
pub use costs::*;
pub use performance::*;
pub use risk::*;
pub use valuation::*;
