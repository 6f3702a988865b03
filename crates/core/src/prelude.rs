//! Rebates prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    calculator::{CalculationError, CalculationInput, RebateCalculation, TierBreakdown, calculate},
    currency::{UnknownCurrency, currency_from_code, round_to_minor_units},
    periods::{Period, PeriodError},
    projection::{TurnoverProjection, project},
    report::{ReportError, write_breakdown, write_simulation},
    schedules::{ScheduleError, load_schedule, parse_schedule},
    simulation::{ScenarioParseError, SimulationResult, TurnoverScenario, simulate, simulate_iter},
    tiers::{DiscountConfig, DiscountMode, Tier, TurnoverBasis, ValidationError, validate},
};
