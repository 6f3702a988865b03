//! Contracts service errors.

use rebates::{currency::UnknownCurrency, tiers::ValidationError};
use rust_decimal::Decimal;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::database::{self, EXCLUSION_VIOLATION};

#[derive(Debug, Error)]
pub enum ContractsServiceError {
    #[error("contract already exists")]
    AlreadyExists,

    #[error("contract not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("discount config {index} is invalid")]
    InvalidDiscountConfig {
        index: usize,
        #[source]
        source: ValidationError,
    },

    #[error("turnover must not be negative, got {0}")]
    NegativeTurnover(Decimal),

    #[error("turnover period overlaps an existing turnover of this contract")]
    TurnoverOverlap,

    #[error("recorded turnover covers {covered_days} of {period_days} days of the prior period")]
    IncompletePriorTurnover { covered_days: i64, period_days: i64 },

    #[error("end date is before start date")]
    InvalidDateRange,

    #[error(transparent)]
    UnknownCurrency(#[from] UnknownCurrency),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl ContractsServiceError {
    /// Whether the failure is transient and the operation may be retried.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Sql(error) if database::is_transient(error))
    }
}

impl From<Error> for ContractsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if database::sqlstate(&error).as_deref() == Some(EXCLUSION_VIOLATION) {
            return Self::TurnoverOverlap;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}
