pub mod cashflow_classifier;
pub mod cashflow_model;
pub mod cashflow_traits;

pub use cashflow_classifier::*;
pub use cashflow_model::*;
pub use cashflow_traits::*;
