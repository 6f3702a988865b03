//! Calculation Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use rebates::{
    calculator::{RebateCalculation, TierBreakdown},
    periods::Period,
    projection::TurnoverProjection,
    simulation::SimulationResult,
    tiers::DiscountConfig,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    domain::{contracts::records::ContractUuid, enterprises::records::EnterpriseUuid},
    uuids::TypedUuid,
};

/// Calculation UUID
pub type CalculationUuid = TypedUuid<CalculationRecord>;

/// Lifecycle state of a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    /// Provisional; may still be finalised.
    Draft,

    /// Frozen.
    Final,
}

impl CalculationStatus {
    /// Stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for CalculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised calculation status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown calculation status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for CalculationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "final" => Ok(Self::Final),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Calculation Record
///
/// `discount_config` is a copy of the schedule used, not a reference to the
/// contract, so later schedule changes never alter past calculations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    pub uuid: CalculationUuid,
    pub enterprise_uuid: EnterpriseUuid,
    pub contract_uuid: ContractUuid,
    pub period: Period,
    pub achieved_turnover: Decimal,
    pub prior_period_turnover: Option<Decimal>,
    pub rebate_base: Decimal,
    pub currency: String,
    pub status: CalculationStatus,
    pub total_rebate: Decimal,
    pub effective_rate: Decimal,
    pub tier_breakdown: Vec<TierBreakdown>,
    pub discount_config: DiscountConfig,
    pub created_at: Timestamp,
    pub finalized_at: Option<Timestamp>,
}

impl CalculationRecord {
    /// The calculator output this record stores.
    #[must_use]
    pub fn calculation(&self) -> RebateCalculation {
        RebateCalculation {
            achieved_turnover: self.achieved_turnover,
            prior_period_turnover: self.prior_period_turnover,
            rebate_base: self.rebate_base,
            total_rebate: self.total_rebate,
            effective_rate: self.effective_rate,
            tier_breakdown: self.tier_breakdown.clone(),
        }
    }
}

/// Simulation outcomes for a contract, in the contract's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    pub contract_uuid: ContractUuid,
    pub currency: String,
    pub prior_period_turnover: Option<Decimal>,
    pub results: Vec<SimulationResult>,
}

/// Rebate earned so far and the rebate expected by period end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedRebate {
    pub contract_uuid: ContractUuid,
    pub currency: String,
    pub projection: TurnoverProjection,
    pub current: RebateCalculation,
    pub projected: RebateCalculation,
}
