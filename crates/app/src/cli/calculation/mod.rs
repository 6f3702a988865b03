use clap::{Args, Subcommand};
use rebates::{currency::currency_from_code, report::write_breakdown};
use rebates_app::domain::calculations::records::CalculationRecord;

use crate::cli::{failure, print_json};

mod create;
mod finalize;
mod list;
mod project;

#[derive(Debug, Args)]
pub(crate) struct CalculationCommand {
    #[command(subcommand)]
    command: CalculationSubcommand,
}

#[derive(Debug, Subcommand)]
enum CalculationSubcommand {
    Create(create::CreateCalculationArgs),
    Finalize(finalize::FinalizeArgs),
    List(list::ListArgs),
    Project(project::ProjectArgs),
}

pub(crate) async fn run(command: CalculationCommand) -> Result<(), String> {
    match command.command {
        CalculationSubcommand::Create(args) => create::run(args).await,
        CalculationSubcommand::Finalize(args) => finalize::run(args).await,
        CalculationSubcommand::List(args) => list::run(args).await,
        CalculationSubcommand::Project(args) => project::run(args).await,
    }
}

/// Print a calculation header and its tier breakdown.
fn print_calculation(record: &CalculationRecord, json: bool) -> Result<(), String> {
    if json {
        return print_json(record);
    }

    let currency =
        currency_from_code(&record.currency).map_err(|error| failure("invalid record", &error))?;

    println!("calculation_uuid: {}", record.uuid);
    println!("contract_uuid: {}", record.contract_uuid);
    println!("period: {}", record.period);
    println!("status: {}", record.status);
    println!("schedule: {}", record.discount_config.mode().as_str());

    if let Some(prior) = record.prior_period_turnover {
        println!("prior_period_turnover: {prior}");
    }

    write_breakdown(std::io::stdout().lock(), &record.calculation(), currency)
        .map_err(|error| failure("failed to write breakdown", &error))
}
