//! Calculations service errors.

use rebates::{calculator::CalculationError, currency::UnknownCurrency, tiers::ValidationError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{
    database::{self, EXCLUSION_VIOLATION},
    domain::contracts::ContractsServiceError,
};

#[derive(Debug, Error)]
pub enum CalculationsServiceError {
    #[error("contract not found")]
    ContractNotFound,

    #[error("contract has no discount config")]
    NoDiscountConfig,

    #[error("contract has {0} discount configs; combining schedules is not supported")]
    AmbiguousDiscountConfig(usize),

    #[error("invalid discount config: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    UnknownCurrency(#[from] UnknownCurrency),

    #[error("no turnover recorded for the prior period")]
    PriorTurnoverNotFound,

    #[error(transparent)]
    Calculation(#[from] CalculationError),

    #[error("a calculation already covers an overlapping period for this contract")]
    PeriodOverlap,

    #[error("calculation is already final")]
    AlreadyFinal,

    #[error("calculation already exists")]
    AlreadyExists,

    #[error("calculation not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("contract lookup failed")]
    Contracts(#[source] ContractsServiceError),

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CalculationsServiceError {
    /// Whether the failure is transient and the operation may be retried.
    ///
    /// Business-rule failures are final.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Sql(error) => database::is_transient(error),
            Self::Contracts(error) => error.is_retryable(),
            _ => false,
        }
    }

    /// Map a contract lookup failure.
    pub(crate) fn from_contract_lookup(error: ContractsServiceError) -> Self {
        match error {
            ContractsServiceError::NotFound => Self::ContractNotFound,
            other => Self::Contracts(other),
        }
    }

    /// Map a prior-period turnover lookup failure.
    pub(crate) fn from_prior_turnover_lookup(error: ContractsServiceError) -> Self {
        match error {
            ContractsServiceError::NotFound => Self::PriorTurnoverNotFound,
            other => Self::Contracts(other),
        }
    }
}

impl From<Error> for CalculationsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        if database::sqlstate(&error).as_deref() == Some(EXCLUSION_VIOLATION) {
            return Self::PeriodOverlap;
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
