//! Calculator
//!
//! Apportions turnover across a validated schedule and prices each tier.
//! The same function backs persisted calculations, simulations and
//! projections, so identical inputs always produce identical breakdowns.

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    currency::round_to_minor_units,
    tiers::{DiscountConfig, DiscountMode, Tier},
};

/// Decimal places kept on effective rates.
pub const EFFECTIVE_RATE_DP: u32 = 6;

/// Errors raised while calculating a rebate.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalculationError {
    /// A turnover figure is negative.
    #[error("{field} must not be negative, got {value}")]
    InvalidInput {
        /// Name of the rejected input.
        field: String,
        /// The rejected value.
        value: Decimal,
    },

    /// The config has not been through validation.
    #[error("discount config has not been validated")]
    UnvalidatedConfig,

    /// A growth-based schedule was given no prior-period turnover.
    #[error("growth-based schedule requires prior period turnover")]
    MissingPriorTurnover,

    /// Decimal arithmetic exceeded its range.
    #[error("arithmetic overflow while calculating rebate")]
    Overflow,
}

/// Turnover figures fed to the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Turnover achieved in the period.
    pub achieved_turnover: Decimal,

    /// Turnover achieved in the prior period, for growth-based schedules.
    pub prior_period_turnover: Option<Decimal>,
}

impl CalculationInput {
    /// Input with achieved turnover only.
    pub const fn new(achieved_turnover: Decimal) -> Self {
        Self {
            achieved_turnover,
            prior_period_turnover: None,
        }
    }

    /// Attach the prior-period turnover.
    #[must_use]
    pub const fn with_prior_period_turnover(mut self, prior: Decimal) -> Self {
        self.prior_period_turnover = Some(prior);
        self
    }
}

/// One tier's share of a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBreakdown {
    /// Position of the tier in the schedule.
    pub tier_index: usize,

    /// Tier lower bound.
    pub lower_bound: Decimal,

    /// Tier upper bound, `None` when unbounded.
    pub upper_bound: Option<Decimal>,

    /// Tier rate.
    pub rate: Decimal,

    /// Portion of the rebate base falling inside the tier.
    pub turnover_in_tier: Decimal,

    /// Rebate earned in the tier, rounded to the currency's minor unit.
    pub rebate_amount: Decimal,
}

/// The result of applying a schedule to turnover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebateCalculation {
    /// Turnover achieved in the period.
    pub achieved_turnover: Decimal,

    /// Prior-period turnover used, if any.
    pub prior_period_turnover: Option<Decimal>,

    /// Turnover the schedule was applied to.
    pub rebate_base: Decimal,

    /// Sum of the per-tier rebate amounts.
    pub total_rebate: Decimal,

    /// `total_rebate / achieved_turnover`, six decimal places.
    pub effective_rate: Decimal,

    /// One entry per tier, ascending.
    pub tier_breakdown: Vec<TierBreakdown>,
}

impl RebateCalculation {
    /// Highest tier with turnover in it.
    pub fn tier_reached(&self) -> Option<&TierBreakdown> {
        self.tier_breakdown
            .iter()
            .rev()
            .find(|tier| tier.turnover_in_tier > Decimal::ZERO)
    }
}

/// Calculate the rebate earned under `config`.
///
/// # Errors
///
/// - [`CalculationError::UnvalidatedConfig`] if `config` was not validated.
/// - [`CalculationError::InvalidInput`] for negative turnover.
/// - [`CalculationError::MissingPriorTurnover`] for growth-based schedules without prior turnover.
/// - [`CalculationError::Overflow`] if decimal arithmetic overflows.
pub fn calculate(
    config: &DiscountConfig,
    input: CalculationInput,
    currency: &Currency,
) -> Result<RebateCalculation, CalculationError> {
    if !config.is_validated() {
        return Err(CalculationError::UnvalidatedConfig);
    }

    ensure_non_negative("achieved_turnover", input.achieved_turnover)?;

    if let Some(prior) = input.prior_period_turnover {
        ensure_non_negative("prior_period_turnover", prior)?;
    }

    let flat_tier;

    let (tiers, rebate_base): (&[Tier], Decimal) = match config.mode() {
        DiscountMode::Flat { rate } => {
            flat_tier = [Tier::unbounded(Decimal::ZERO, *rate)];

            (flat_tier.as_slice(), input.achieved_turnover)
        }
        DiscountMode::ProgressiveTiered { tiers } => (tiers.as_slice(), input.achieved_turnover),
        DiscountMode::GrowthBased { tiers } => {
            let prior = input
                .prior_period_turnover
                .ok_or(CalculationError::MissingPriorTurnover)?;

            let growth = input
                .achieved_turnover
                .checked_sub(prior)
                .ok_or(CalculationError::Overflow)?;

            (tiers.as_slice(), growth.max(Decimal::ZERO))
        }
    };

    let tier_breakdown = apportion(tiers, rebate_base, currency)?;

    let total_rebate = tier_breakdown
        .iter()
        .try_fold(Decimal::ZERO, |total, tier| {
            total.checked_add(tier.rebate_amount)
        })
        .ok_or(CalculationError::Overflow)?;

    let effective_rate = effective_rate(total_rebate, input.achieved_turnover)?;

    Ok(RebateCalculation {
        achieved_turnover: input.achieved_turnover,
        prior_period_turnover: input.prior_period_turnover,
        rebate_base,
        total_rebate,
        effective_rate,
        tier_breakdown,
    })
}

/// `total / turnover` at six decimal places; zero turnover yields zero.
///
/// # Errors
///
/// Returns [`CalculationError::Overflow`] if the division overflows.
pub fn effective_rate(total: Decimal, turnover: Decimal) -> Result<Decimal, CalculationError> {
    if turnover.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let rate = total
        .checked_div(turnover)
        .ok_or(CalculationError::Overflow)?;

    Ok(rate.round_dp_with_strategy(EFFECTIVE_RATE_DP, RoundingStrategy::MidpointAwayFromZero))
}

fn ensure_non_negative(field: &str, value: Decimal) -> Result<(), CalculationError> {
    if value < Decimal::ZERO {
        return Err(CalculationError::InvalidInput {
            field: field.to_string(),
            value,
        });
    }

    Ok(())
}

fn apportion(
    tiers: &[Tier],
    base: Decimal,
    currency: &Currency,
) -> Result<Vec<TierBreakdown>, CalculationError> {
    tiers
        .iter()
        .enumerate()
        .map(|(tier_index, tier)| {
            let ceiling = tier.upper_bound().map_or(base, |upper| upper.min(base));

            let turnover_in_tier = ceiling
                .checked_sub(tier.lower_bound())
                .ok_or(CalculationError::Overflow)?
                .max(Decimal::ZERO);

            let raw = turnover_in_tier
                .checked_mul(tier.rate())
                .ok_or(CalculationError::Overflow)?;

            Ok(TierBreakdown {
                tier_index,
                lower_bound: tier.lower_bound(),
                upper_bound: tier.upper_bound(),
                rate: tier.rate(),
                turnover_in_tier,
                rebate_amount: round_to_minor_units(raw, currency),
            })
        })
        .collect()
}
