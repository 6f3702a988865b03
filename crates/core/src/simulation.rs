//! Simulation
//!
//! What-if evaluation of a schedule against hypothetical turnovers. Each
//! scenario is calculated independently; a failing scenario is reported in
//! its own result and never aborts the batch.

use std::str::FromStr;

use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    calculator::{CalculationError, CalculationInput, RebateCalculation, calculate},
    tiers::DiscountConfig,
};

/// Errors from parsing a scenario on the command line.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScenarioParseError {
    /// The scenario had an empty name before `=`.
    #[error("scenario name must not be empty")]
    EmptyName,

    /// The turnover was not a decimal number.
    #[error("invalid turnover {0:?}")]
    InvalidTurnover(String),
}

/// A hypothetical turnover to evaluate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnoverScenario {
    /// Label shown in reports.
    pub name: String,

    /// Hypothetical achieved turnover.
    pub turnover: Decimal,

    /// Prior-period turnover overriding the batch-level one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_period_turnover: Option<Decimal>,
}

impl TurnoverScenario {
    /// Scenario named after its turnover.
    pub fn new(turnover: Decimal) -> Self {
        Self::named(turnover.to_string(), turnover)
    }

    /// Scenario with an explicit label.
    pub fn named(name: impl Into<String>, turnover: Decimal) -> Self {
        Self {
            name: name.into(),
            turnover,
            prior_period_turnover: None,
        }
    }

    /// Override the prior-period turnover for this scenario only.
    #[must_use]
    pub fn with_prior_period_turnover(mut self, prior: Decimal) -> Self {
        self.prior_period_turnover = Some(prior);
        self
    }
}

/// Parses `name=amount` or a bare `amount`.
impl FromStr for TurnoverScenario {
    type Err = ScenarioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, amount) = match s.split_once('=') {
            Some((name, amount)) => {
                let name = name.trim();

                if name.is_empty() {
                    return Err(ScenarioParseError::EmptyName);
                }

                (Some(name), amount.trim())
            }
            None => (None, s.trim()),
        };

        let turnover = Decimal::from_str(amount)
            .map_err(|_err| ScenarioParseError::InvalidTurnover(amount.to_string()))?;

        Ok(match name {
            Some(name) => Self::named(name, turnover),
            None => Self::new(turnover),
        })
    }
}

/// The outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Scenario label.
    pub scenario: String,

    /// Scenario turnover.
    pub turnover: Decimal,

    /// Calculation, or the reason this scenario could not be calculated.
    pub outcome: Result<RebateCalculation, CalculationError>,
}

impl SimulationResult {
    /// Whether the scenario calculated successfully.
    pub const fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Evaluate scenarios lazily, one result per scenario in input order.
///
/// Dropping the iterator stops the batch.
pub fn simulate_iter<'a>(
    config: &'a DiscountConfig,
    currency: &'a Currency,
    scenarios: &'a [TurnoverScenario],
    prior_period_turnover: Option<Decimal>,
) -> impl Iterator<Item = SimulationResult> + 'a {
    scenarios.iter().map(move |scenario| {
        let input = CalculationInput {
            achieved_turnover: scenario.turnover,
            prior_period_turnover: scenario.prior_period_turnover.or(prior_period_turnover),
        };

        SimulationResult {
            scenario: scenario.name.clone(),
            turnover: scenario.turnover,
            outcome: calculate(config, input, currency),
        }
    })
}

/// Evaluate every scenario against `config`.
pub fn simulate(
    config: &DiscountConfig,
    currency: &Currency,
    scenarios: &[TurnoverScenario],
    prior_period_turnover: Option<Decimal>,
) -> Vec<SimulationResult> {
    simulate_iter(config, currency, scenarios, prior_period_turnover).collect()
}
