use std::path::PathBuf;

use clap::{Args, Subcommand};
use rebates::{schedules::load_schedule, tiers::DiscountConfig};
use rebates_app::domain::contracts::records::ContractRecord;

use crate::cli::failure;

mod create;
mod schedule;

#[derive(Debug, Args)]
pub(crate) struct ContractCommand {
    #[command(subcommand)]
    command: ContractSubcommand,
}

#[derive(Debug, Subcommand)]
enum ContractSubcommand {
    Create(create::CreateContractArgs),
    Schedule(schedule::ScheduleArgs),
}

pub(crate) async fn run(command: ContractCommand) -> Result<(), String> {
    match command.command {
        ContractSubcommand::Create(args) => create::run(args).await,
        ContractSubcommand::Schedule(args) => schedule::run(args).await,
    }
}

/// Where a contract's discount schedules come from.
#[derive(Debug, Args)]
struct ScheduleSource {
    /// Discount schedule YAML file; repeat for several schedules
    #[arg(long = "schedule", value_name = "FILE")]
    schedules: Vec<PathBuf>,

    /// Use the default progressive schedule
    #[arg(long, conflicts_with = "schedules")]
    default_schedule: bool,
}

impl ScheduleSource {
    fn load(&self) -> Result<Vec<DiscountConfig>, String> {
        if self.default_schedule {
            return Ok(vec![DiscountConfig::default_progressive()]);
        }

        self.schedules
            .iter()
            .map(|path| {
                load_schedule(path)
                    .map_err(|error| failure(&format!("failed to load {}", path.display()), &error))
            })
            .collect()
    }
}

fn print_contract(contract: &ContractRecord) {
    println!("contract_uuid: {}", contract.uuid);
    println!("contract_name: {}", contract.name);
    println!("currency: {}", contract.currency);

    for (index, config) in contract.discount_configs.iter().enumerate() {
        println!("schedule[{index}]: {}", config.mode().as_str());
    }
}
