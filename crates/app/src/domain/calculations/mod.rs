//! Calculations
//!
//! Rebate calculation records: created as drafts from a contract's current
//! schedule, finalised once, and immutable afterwards.

pub mod data;
pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::CalculationsServiceError;
pub use repository::{CalculationsRepository, MockCalculationsRepository, PgCalculationsRepository};
pub use service::*;
