//! Dashboard
//!
//! Enterprise-wide rebate figures. Final calculations make up the totals;
//! drafts are shown separately as provisional.

pub mod errors;
pub mod service;
pub mod summary;

pub use errors::DashboardServiceError;
pub use service::*;
pub use summary::{DashboardSummary, summarize};
