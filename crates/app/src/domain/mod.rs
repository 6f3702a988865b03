//! Rebate Domain Concerns

pub mod calculations;
pub mod contracts;
pub mod dashboard;
pub mod enterprises;
