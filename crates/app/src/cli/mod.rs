use clap::{Args, Parser, Subcommand};
use jiff::civil::Date;
use rebates::periods::Period;
use rebates_app::{
    config::{DatabaseConfig, LoggingConfig},
    context::AppContext,
    domain::enterprises::records::EnterpriseUuid,
};
use serde::Serialize;
use uuid::Uuid;

mod calculation;
mod contract;
mod dashboard;
mod enterprise;
mod simulate;
mod turnover;

#[derive(Debug, Parser)]
#[command(name = "rebates-app", about = "Tiered rebate (RFA) CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Enterprise(enterprise::EnterpriseCommand),
    Contract(contract::ContractCommand),
    Turnover(turnover::TurnoverCommand),
    Calculation(calculation::CalculationCommand),
    Simulate(simulate::SimulateArgs),
    Dashboard(dashboard::DashboardArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Enterprise(command) => enterprise::run(command).await,
            Commands::Contract(command) => contract::run(command).await,
            Commands::Turnover(command) => turnover::run(command).await,
            Commands::Calculation(command) => calculation::run(command).await,
            Commands::Simulate(args) => simulate::run(args).await,
            Commands::Dashboard(args) => dashboard::run(args).await,
        }
    }
}

/// Database connection and the enterprise a command acts for.
#[derive(Debug, Args)]
struct EnterpriseScope {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Enterprise UUID
    #[arg(long, env = "REBATES_ENTERPRISE")]
    enterprise: Uuid,
}

impl EnterpriseScope {
    fn enterprise(&self) -> EnterpriseUuid {
        EnterpriseUuid::from_uuid(self.enterprise)
    }

    async fn connect(&self) -> Result<AppContext, String> {
        connect(&self.database).await
    }
}

/// An inclusive date range.
#[derive(Debug, Args)]
struct PeriodArgs {
    /// First day of the period (YYYY-MM-DD)
    #[arg(long)]
    from: Date,

    /// Last day of the period, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Date,
}

impl PeriodArgs {
    fn period(&self) -> Result<Period, String> {
        Period::new(self.from, self.to).map_err(|error| failure("invalid period", &error))
    }
}

async fn connect(database: &DatabaseConfig) -> Result<AppContext, String> {
    AppContext::from_database_url(&database.database_url)
        .await
        .map_err(|error| failure("failed to initialise", &error))
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|error| format!("failed to encode output: {error}"))?;

    println!("{json}");

    Ok(())
}

/// Render an error's sources, innermost last.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut causes = Vec::new();
    let mut source = error.source();

    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }

    causes.join(": ")
}

/// `message: error: source: ...`
fn failure(message: &str, error: &dyn std::error::Error) -> String {
    let chain = error_chain(error);

    if chain.is_empty() {
        format!("{message}: {error}")
    } else {
        format!("{message}: {error}: {chain}")
    }
}
