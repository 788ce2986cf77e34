mod error;
pub mod expert_search;
pub mod models;
pub mod ports;
pub mod services;

pub use error::*;
