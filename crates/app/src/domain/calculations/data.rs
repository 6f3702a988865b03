//! Calculations Data

use jiff::civil::Date;
use rebates::{
    calculator::RebateCalculation, periods::Period, simulation::TurnoverScenario,
    tiers::DiscountConfig,
};
use rust_decimal::Decimal;

use crate::domain::{
    calculations::records::{CalculationRecord, CalculationStatus, CalculationUuid},
    contracts::records::ContractUuid,
};

/// New Calculation Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCalculation {
    pub uuid: CalculationUuid,
    pub contract: ContractUuid,
    pub period: Period,
    pub achieved_turnover: Decimal,
}

/// A calculated draft ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationDraft {
    pub uuid: CalculationUuid,
    pub contract: ContractUuid,
    pub period: Period,
    pub currency: String,
    pub calculation: RebateCalculation,
    pub discount_config: DiscountConfig,
}

/// Calculation list filters. Unset fields do not narrow the results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculationFilters {
    pub contract: Option<ContractUuid>,
    pub status: Option<CalculationStatus>,

    /// Only periods starting on or after this date.
    pub from: Option<Date>,

    /// Only periods ending on or before this date.
    pub to: Option<Date>,
}

impl CalculationFilters {
    /// Whether `record` passes every set filter.
    #[must_use]
    pub fn matches(&self, record: &CalculationRecord) -> bool {
        self.contract.is_none_or(|contract| record.contract_uuid == contract)
            && self.status.is_none_or(|status| record.status == status)
            && self.from.is_none_or(|from| record.period.start() >= from)
            && self.to.is_none_or(|to| record.period.end() <= to)
    }
}

/// Hypothetical turnovers to evaluate against a contract's schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub contract: ContractUuid,
    pub scenarios: Vec<TurnoverScenario>,

    /// Period used to look up prior-period turnover for growth-based schedules.
    pub period: Option<Period>,
}

/// Turnover observed part-way through a period.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionRequest {
    pub contract: ContractUuid,
    pub period: Period,
    pub turnover_to_date: Decimal,
    pub as_of: Date,
}
