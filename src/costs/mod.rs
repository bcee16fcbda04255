pub mod costs_model;
pub mod costs_service;

pub use costs_model::*;
pub use costs_service::*;
