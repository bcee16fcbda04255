pub mod cancellation;
pub mod time_utils;
