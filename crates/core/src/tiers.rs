//! Tiers
//!
//! A [`DiscountConfig`] describes how a contract's rebate is earned. Tiered
//! modes split turnover into contiguous bands, each with its own rate
//! (e.g. 5% up to 10 000, 8% up to 50 000, 12% beyond). Configs must pass
//! [`validate`] before the calculator will accept them; configs read from
//! storage or files always start out unvalidated.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural defects in a discount schedule.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A tiered schedule has no tiers.
    #[error("discount schedule has no tiers")]
    NoTiers,

    /// More than one tier lacks an upper bound.
    #[error("{count} tiers are unbounded; at most one is allowed")]
    MultipleUnbounded {
        /// Number of unbounded tiers found.
        count: usize,
    },

    /// A rate lies outside `[0, 1]`.
    #[error("tier {index} has rate {rate}, expected a fraction between 0 and 1")]
    RateOutOfRange {
        /// Index of the offending tier (0 for flat configs).
        index: usize,
        /// The rejected rate.
        rate: Decimal,
    },

    /// The first tier does not start at zero turnover.
    #[error("first tier starts at {lower_bound}, expected 0")]
    FirstTierNotAtZero {
        /// Lower bound of the first tier.
        lower_bound: Decimal,
    },

    /// A bounded tier whose upper bound does not exceed its lower bound.
    #[error("tier {index} is empty: upper bound must exceed lower bound")]
    EmptyTier {
        /// Index of the offending tier.
        index: usize,
    },

    /// A tier starts before the previous tier ends.
    #[error("tier {index} overlaps the previous tier")]
    Overlap {
        /// Index of the later of the two overlapping tiers.
        index: usize,
    },

    /// A tier starts after the previous tier ends.
    #[error("tier {index} leaves a gap after the previous tier")]
    Gap {
        /// Index of the tier following the gap.
        index: usize,
    },
}

/// A turnover band and the rate applied to turnover falling inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    lower_bound: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper_bound: Option<Decimal>,
    rate: Decimal,
}

impl Tier {
    /// Create a tier; `None` as the upper bound means unbounded.
    pub const fn new(lower_bound: Decimal, upper_bound: Option<Decimal>, rate: Decimal) -> Self {
        Self {
            lower_bound,
            upper_bound,
            rate,
        }
    }

    /// Create a tier with both bounds.
    pub const fn bounded(lower_bound: Decimal, upper_bound: Decimal, rate: Decimal) -> Self {
        Self::new(lower_bound, Some(upper_bound), rate)
    }

    /// Create an open-ended top tier.
    pub const fn unbounded(lower_bound: Decimal, rate: Decimal) -> Self {
        Self::new(lower_bound, None, rate)
    }

    /// Turnover at which this tier starts.
    pub const fn lower_bound(&self) -> Decimal {
        self.lower_bound
    }

    /// Turnover at which this tier ends, if bounded.
    pub const fn upper_bound(&self) -> Option<Decimal> {
        self.upper_bound
    }

    /// Fraction of in-tier turnover paid back as rebate.
    pub const fn rate(&self) -> Decimal {
        self.rate
    }
}

/// How the rebate is earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DiscountMode {
    /// One rate over the whole achieved turnover.
    Flat {
        /// Rebate rate as a fraction.
        rate: Decimal,
    },

    /// Progressive tiers over the achieved turnover.
    ProgressiveTiered {
        /// Contiguous tiers, ascending.
        tiers: Vec<Tier>,
    },

    /// Progressive tiers over growth against the prior period.
    GrowthBased {
        /// Contiguous tiers, ascending.
        tiers: Vec<Tier>,
    },
}

impl DiscountMode {
    /// Stable name used in storage and reports.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DiscountMode::Flat { .. } => "flat",
            DiscountMode::ProgressiveTiered { .. } => "progressive_tiered",
            DiscountMode::GrowthBased { .. } => "growth_based",
        }
    }
}

/// Turnover metric the schedule applies to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverBasis {
    /// Net sales excluding tax (HT).
    #[default]
    NetExcludingTax,

    /// Sales including tax (TTC).
    GrossIncludingTax,
}

/// A contract's discount configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountConfig {
    #[serde(flatten)]
    mode: DiscountMode,

    #[serde(default)]
    basis: TurnoverBasis,

    #[serde(skip)]
    validated: bool,
}

impl DiscountConfig {
    /// Create an unvalidated config.
    pub const fn new(mode: DiscountMode, basis: TurnoverBasis) -> Self {
        Self {
            mode,
            basis,
            validated: false,
        }
    }

    /// Flat-rate config over net turnover.
    pub const fn flat(rate: Decimal) -> Self {
        Self::new(DiscountMode::Flat { rate }, TurnoverBasis::NetExcludingTax)
    }

    /// Progressive config over net turnover.
    pub const fn progressive(tiers: Vec<Tier>) -> Self {
        Self::new(
            DiscountMode::ProgressiveTiered { tiers },
            TurnoverBasis::NetExcludingTax,
        )
    }

    /// Growth-based config over net turnover.
    pub const fn growth_based(tiers: Vec<Tier>) -> Self {
        Self::new(
            DiscountMode::GrowthBased { tiers },
            TurnoverBasis::NetExcludingTax,
        )
    }

    /// The default progressive schedule offered for new contracts.
    pub fn default_progressive() -> Self {
        Self::progressive(vec![
            Tier::bounded(Decimal::ZERO, Decimal::from(100_000), Decimal::ZERO),
            Tier::bounded(
                Decimal::from(100_000),
                Decimal::from(200_000),
                Decimal::new(2, 2),
            ),
            Tier::bounded(
                Decimal::from(200_000),
                Decimal::from(500_000),
                Decimal::new(3, 2),
            ),
            Tier::bounded(
                Decimal::from(500_000),
                Decimal::from(1_000_000),
                Decimal::new(4, 2),
            ),
            Tier::unbounded(Decimal::from(1_000_000), Decimal::new(5, 2)),
        ])
    }

    /// Replace the turnover basis.
    #[must_use]
    pub fn with_basis(mut self, basis: TurnoverBasis) -> Self {
        self.basis = basis;
        self
    }

    /// Validate the schedule and mark the config as ready for calculation.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found by [`validate`].
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        validate(&self)?;

        self.validated = true;

        Ok(self)
    }

    /// Whether this config passed [`DiscountConfig::validated`].
    pub const fn is_validated(&self) -> bool {
        self.validated
    }

    /// Return the mode.
    pub const fn mode(&self) -> &DiscountMode {
        &self.mode
    }

    /// Return the turnover basis.
    pub const fn basis(&self) -> TurnoverBasis {
        self.basis
    }

    /// Whether the config needs prior-period turnover to calculate.
    pub const fn requires_prior_period_turnover(&self) -> bool {
        matches!(self.mode, DiscountMode::GrowthBased { .. })
    }
}

impl PartialEq for DiscountConfig {
    fn eq(&self, other: &Self) -> bool {
        self.mode == other.mode && self.basis == other.basis
    }
}

impl Eq for DiscountConfig {}

/// Check a config for structural defects.
///
/// Rates may rise or fall from one tier to the next; only the shape of the
/// schedule is checked.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn validate(config: &DiscountConfig) -> Result<(), ValidationError> {
    match &config.mode {
        DiscountMode::Flat { rate } => validate_rate(0, *rate),
        DiscountMode::ProgressiveTiered { tiers } | DiscountMode::GrowthBased { tiers } => {
            validate_tiers(tiers)
        }
    }
}

fn validate_rate(index: usize, rate: Decimal) -> Result<(), ValidationError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::RateOutOfRange { index, rate });
    }

    Ok(())
}

fn validate_tiers(tiers: &[Tier]) -> Result<(), ValidationError> {
    let first = tiers.first().ok_or(ValidationError::NoTiers)?;

    let unbounded = tiers
        .iter()
        .filter(|tier| tier.upper_bound.is_none())
        .count();

    if unbounded > 1 {
        return Err(ValidationError::MultipleUnbounded { count: unbounded });
    }

    tiers
        .iter()
        .enumerate()
        .try_for_each(|(index, tier)| validate_rate(index, tier.rate))?;

    if !first.lower_bound.is_zero() {
        return Err(ValidationError::FirstTierNotAtZero {
            lower_bound: first.lower_bound,
        });
    }

    for (index, tier) in tiers.iter().enumerate() {
        if let Some(upper) = tier.upper_bound
            && upper <= tier.lower_bound
        {
            return Err(ValidationError::EmptyTier { index });
        }
    }

    for (offset, pair) in tiers.windows(2).enumerate() {
        let [previous, next] = pair else {
            continue;
        };

        let index = offset + 1;

        match previous.upper_bound {
            // An unbounded tier swallows everything after it.
            None => return Err(ValidationError::Overlap { index }),
            Some(upper) if next.lower_bound < upper => {
                return Err(ValidationError::Overlap { index });
            }
            Some(upper) if next.lower_bound > upper => {
                return Err(ValidationError::Gap { index });
            }
            Some(_) => {}
        }
    }

    Ok(())
}
