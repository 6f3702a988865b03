//! Schedules
//!
//! Discount schedules written as YAML, e.g.
//!
//! ```yaml
//! mode: progressive_tiered
//! basis: net_excluding_tax
//! tiers:
//!   - { lower_bound: 0, upper_bound: 10000, rate: 0.05 }
//!   - { lower_bound: 10000, rate: 0.08 }
//! ```

use std::{fs, path::Path};

use thiserror::Error;

use crate::tiers::{DiscountConfig, ValidationError};

/// Schedule loading errors
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// IO error reading the schedule file
    #[error("Failed to read schedule file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The schedule parsed but is malformed
    #[error("Invalid schedule: {0}")]
    Invalid(#[from] ValidationError),
}

/// Parse and validate a schedule from YAML.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or the schedule fails validation.
pub fn parse_schedule(contents: &str) -> Result<DiscountConfig, ScheduleError> {
    let config: DiscountConfig = serde_norway::from_str(contents)?;

    Ok(config.validated()?)
}

/// Read, parse and validate a schedule file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, or as [`parse_schedule`].
pub fn load_schedule(path: impl AsRef<Path>) -> Result<DiscountConfig, ScheduleError> {
    let contents = fs::read_to_string(path)?;

    parse_schedule(&contents)
}
