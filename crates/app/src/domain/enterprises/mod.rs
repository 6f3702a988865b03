//! Enterprises

pub mod data;
pub mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::EnterprisesServiceError;
pub use service::*;
