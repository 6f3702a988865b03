//! Report
//!
//! Plain-text tables for calculation breakdowns and simulation batches.

use std::io;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{calculator::RebateCalculation, simulation::SimulationResult};

/// Errors that can occur when writing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Write a per-tier breakdown followed by the totals.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_breakdown(
    mut out: impl io::Write,
    calculation: &RebateCalculation,
    currency: &Currency,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Tier", "From", "To", "Rate", "Turnover", "Rebate"]);

    for tier in &calculation.tier_breakdown {
        builder.push_record([
            (tier.tier_index + 1).to_string(),
            money(tier.lower_bound, currency),
            tier.upper_bound
                .map_or_else(|| "-".to_string(), |upper| money(upper, currency)),
            percent(tier.rate),
            money(tier.turnover_in_tier, currency),
            money(tier.rebate_amount, currency),
        ]);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..6), Alignment::right());
    table.modify(Rows::first(), Alignment::center());

    writeln!(out, "\n{table}")?;
    writeln!(
        out,
        " Turnover:       {}",
        money(calculation.achieved_turnover, currency)
    )?;

    if let Some(prior) = calculation.prior_period_turnover {
        writeln!(out, " Prior period:   {}", money(prior, currency))?;
        writeln!(
            out,
            " Rebate base:    {}",
            money(calculation.rebate_base, currency)
        )?;
    }

    writeln!(
        out,
        " Total rebate:   {}",
        money(calculation.total_rebate, currency)
    )?;
    writeln!(
        out,
        " Effective rate: {}",
        percent(calculation.effective_rate)
    )?;

    Ok(())
}

/// Write one row per simulated scenario, failures included.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_simulation(
    mut out: impl io::Write,
    results: &[SimulationResult],
    currency: &Currency,
) -> Result<(), ReportError> {
    let mut builder = Builder::default();

    builder.push_record(["Scenario", "Turnover", "Rebate", "Effective Rate", "Tier Reached"]);

    for result in results {
        let row = match &result.outcome {
            Ok(calculation) => [
                result.scenario.clone(),
                money(result.turnover, currency),
                money(calculation.total_rebate, currency),
                percent(calculation.effective_rate),
                calculation
                    .tier_reached()
                    .map_or_else(|| "-".to_string(), |tier| (tier.tier_index + 1).to_string()),
            ],
            Err(error) => [
                result.scenario.clone(),
                money(result.turnover, currency),
                "-".to_string(),
                "-".to_string(),
                error.to_string(),
            ],
        };

        builder.push_record(row);
    }

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "\n{table}")?;

    Ok(())
}

fn money(amount: Decimal, currency: &Currency) -> String {
    Money::from_decimal(amount, currency).to_string()
}

fn percent(rate: Decimal) -> String {
    format!("{}%", (rate * Decimal::ONE_HUNDRED).normalize())
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::EUR;
    use testresult::TestResult;

    use super::*;
    use crate::{
        calculator::{CalculationInput, calculate},
        simulation::{TurnoverScenario, simulate},
        tiers::{DiscountConfig, Tier},
    };

    fn schedule() -> Result<DiscountConfig, crate::tiers::ValidationError> {
        DiscountConfig::progressive(vec![
            Tier::bounded(Decimal::ZERO, Decimal::from(10_000), Decimal::new(5, 2)),
            Tier::bounded(Decimal::from(10_000), Decimal::from(50_000), Decimal::new(8, 2)),
            Tier::unbounded(Decimal::from(50_000), Decimal::new(12, 2)),
        ])
        .validated()
    }

    #[test]
    fn breakdown_lists_every_tier_and_total() -> TestResult {
        let calculation = calculate(&schedule()?, CalculationInput::new(Decimal::from(62_000)), EUR)?;

        let mut out = Vec::new();
        write_breakdown(&mut out, &calculation, EUR)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Tier"));
        assert!(rendered.contains("12%"));
        assert!(rendered.contains("Total rebate:"));
        assert!(rendered.contains(&Money::from_decimal(Decimal::from(5_140), EUR).to_string()));
        assert!(rendered.contains("8.2903%"));

        Ok(())
    }

    #[test]
    fn simulation_table_includes_failed_scenarios() -> TestResult {
        let scenarios = [
            TurnoverScenario::named("target", Decimal::from(50_000)),
            TurnoverScenario::named("broken", Decimal::from(-10)),
        ];

        let results = simulate(&schedule()?, EUR, &scenarios, None);

        let mut out = Vec::new();
        write_simulation(&mut out, &results, EUR)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("target"));
        assert!(rendered.contains("broken"));
        assert!(rendered.contains("must not be negative"));

        Ok(())
    }
}
