pub mod valuation_model;
pub mod valuation_traits;

pub use valuation_model::*;
pub use valuation_traits::*;
