//! Dashboard service errors.

use jiff::civil::Date;
use rebates::calculator::CalculationError;
use thiserror::Error;

use crate::domain::calculations::CalculationsServiceError;

#[derive(Debug, Error)]
pub enum DashboardServiceError {
    #[error("period start {from} is after period end {to}")]
    InvalidRange { from: Date, to: Date },

    #[error("failed to load calculations")]
    Calculations(#[from] CalculationsServiceError),

    #[error(transparent)]
    Summary(#[from] CalculationError),
}

impl DashboardServiceError {
    /// Whether the failure is transient and the operation may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Calculations(error) => error.is_retryable(),
            _ => false,
        }
    }
}
