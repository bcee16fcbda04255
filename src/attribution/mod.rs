pub mod attribution_model;
pub mod attribution_service;

pub use attribution_model::*;
pub use attribution_service::*;
