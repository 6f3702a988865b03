//! Projection
//!
//! Extrapolates turnover-to-date linearly to the end of a period, so a
//! contract's likely year-end rebate can be estimated mid-period.

use jiff::civil::Date;
use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    calculator::CalculationError,
    currency::round_to_minor_units,
    periods::{Period, days_between},
};

/// Progress below which turnover is not extrapolated.
pub const MINIMUM_PROGRESS: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Linear year-end estimate of a period's turnover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnoverProjection {
    /// Period being projected.
    pub period: Period,

    /// Date the turnover-to-date was observed.
    pub as_of: Date,

    /// Days of the period elapsed by `as_of`, inclusive.
    pub days_elapsed: i64,

    /// Days in the period, inclusive.
    pub total_days: i64,

    /// `days_elapsed / total_days`, four decimal places.
    pub progress: Decimal,

    /// Turnover observed so far.
    pub turnover_to_date: Decimal,

    /// Turnover expected by the end of the period.
    pub projected_turnover: Decimal,
}

/// Project `turnover_to_date` to the end of `period`.
///
/// `as_of` dates before the period count as no progress; dates after it
/// count as a completed period.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] for negative turnover.
/// - [`CalculationError::Overflow`] if decimal arithmetic overflows.
pub fn project(
    period: Period,
    as_of: Date,
    turnover_to_date: Decimal,
    currency: &Currency,
) -> Result<TurnoverProjection, CalculationError> {
    if turnover_to_date < Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field: "turnover_to_date".to_string(),
            value: turnover_to_date,
        });
    }

    let total_days = period.days();
    let days_elapsed = (days_between(period.start(), as_of) + 1).clamp(0, total_days);

    let exact_progress = Decimal::from(days_elapsed)
        .checked_div(Decimal::from(total_days))
        .ok_or(CalculationError::Overflow)?;

    let projected_turnover = if exact_progress >= MINIMUM_PROGRESS {
        let scaled = turnover_to_date
            .checked_mul(Decimal::from(total_days))
            .ok_or(CalculationError::Overflow)?
            .checked_div(Decimal::from(days_elapsed))
            .ok_or(CalculationError::Overflow)?;

        round_to_minor_units(scaled, currency)
    } else {
        turnover_to_date
    };

    Ok(TurnoverProjection {
        period,
        as_of,
        days_elapsed,
        total_days,
        progress: exact_progress.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
        turnover_to_date,
        projected_turnover,
    })
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use super::*;

    fn year_2025() -> Result<Period, crate::periods::PeriodError> {
        Period::new(date(2025, 1, 1), date(2025, 12, 31))
    }

    #[test]
    fn half_way_doubles_turnover() -> TestResult {
        let period = Period::new(date(2025, 1, 1), date(2025, 1, 10))?;

        let projection = project(period, date(2025, 1, 5), Decimal::from(1_000), EUR)?;

        assert_eq!(projection.days_elapsed, 5);
        assert_eq!(projection.total_days, 10);
        assert_eq!(projection.progress, Decimal::new(5, 1));
        assert_eq!(projection.projected_turnover, Decimal::from(2_000));

        Ok(())
    }

    #[test]
    fn early_progress_returns_turnover_to_date() -> TestResult {
        let projection = project(year_2025()?, date(2025, 1, 2), Decimal::from(500), EUR)?;

        assert_eq!(projection.days_elapsed, 2);
        assert_eq!(projection.projected_turnover, Decimal::from(500));

        Ok(())
    }

    #[test]
    fn as_of_before_period_counts_as_no_progress() -> TestResult {
        let projection = project(year_2025()?, date(2024, 11, 1), Decimal::ZERO, EUR)?;

        assert_eq!(projection.days_elapsed, 0);
        assert!(projection.progress.is_zero());
        assert!(projection.projected_turnover.is_zero());

        Ok(())
    }

    #[test]
    fn as_of_after_period_is_complete() -> TestResult {
        let projection = project(year_2025()?, date(2026, 3, 1), Decimal::from(750), EUR)?;

        assert_eq!(projection.days_elapsed, 365);
        assert_eq!(projection.progress, Decimal::ONE);
        assert_eq!(projection.projected_turnover, Decimal::from(750));

        Ok(())
    }

    #[test]
    fn projected_turnover_is_rounded_to_currency() -> TestResult {
        let period = Period::new(date(2025, 1, 1), date(2025, 1, 3))?;

        let projection = project(period, date(2025, 1, 2), Decimal::from(100), EUR)?;

        assert_eq!(projection.projected_turnover, Decimal::new(15_000, 2));
        assert_eq!(projection.progress, Decimal::new(6_667, 4));

        Ok(())
    }

    #[test]
    fn negative_turnover_is_rejected() -> TestResult {
        let result = project(year_2025()?, date(2025, 6, 1), Decimal::from(-1), EUR);

        assert!(matches!(result, Err(CalculationError::InvalidInput { .. })));

        Ok(())
    }
}
