//! Contracts
//!
//! Commercial contracts between an enterprise and a customer, the discount
//! schedules they carry, and the turnover recorded against them.

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::ContractsServiceError;
pub use service::*;
