pub mod performance_model;
pub mod return_calculator;
pub mod return_service;
pub mod rolling_calculator;

pub use performance_model::*;
pub use return_service::*;
