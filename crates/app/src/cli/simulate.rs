use std::path::{Path, PathBuf};

use clap::Args;
use jiff::civil::Date;
use rebates::{
    currency::currency_from_code,
    periods::Period,
    report::write_simulation,
    schedules::load_schedule,
    simulation::{SimulationResult, TurnoverScenario, simulate},
};
use rebates_app::{
    config::DatabaseConfig,
    domain::{
        calculations::data::SimulationRequest, contracts::records::ContractUuid,
        enterprises::records::EnterpriseUuid,
    },
};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::cli::{connect, failure, print_json};

/// Evaluate what-if turnovers. Nothing is stored.
///
/// Scenarios are `name=amount` or a bare amount.
#[derive(Debug, Args)]
pub(crate) struct SimulateArgs {
    /// Scenarios to evaluate, e.g. `target=250000`
    #[arg(required = true, value_name = "SCENARIO")]
    scenarios: Vec<TurnoverScenario>,

    /// Evaluate against a schedule YAML file, without a database
    #[arg(long, value_name = "FILE", required_unless_present = "contract")]
    schedule: Option<PathBuf>,

    /// Currency for `--schedule`
    #[arg(long, default_value = "EUR", requires = "schedule")]
    currency: String,

    /// Evaluate against a stored contract's schedule
    #[arg(long, conflicts_with = "schedule", requires_all = ["enterprise", "database_url"])]
    contract: Option<Uuid>,

    /// Enterprise UUID for `--contract`
    #[arg(long, env = "REBATES_ENTERPRISE")]
    enterprise: Option<Uuid>,

    /// `PostgreSQL` connection string for `--contract`
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    /// Prior-period turnover for scenarios that do not carry their own
    #[arg(long)]
    prior_turnover: Option<Decimal>,

    /// Period to look up prior-period turnover for, with `--contract`
    #[arg(long, requires_all = ["to", "contract"])]
    from: Option<Date>,

    /// Last day of that period, inclusive
    #[arg(long, requires = "from")]
    to: Option<Date>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct OfflineReport<'a> {
    currency: &'a str,
    prior_period_turnover: Option<Decimal>,
    results: &'a [SimulationResult],
}

pub(crate) async fn run(args: SimulateArgs) -> Result<(), String> {
    let scenarios: Vec<TurnoverScenario> = match args.prior_turnover {
        Some(prior) => args
            .scenarios
            .iter()
            .cloned()
            .map(|scenario| match scenario.prior_period_turnover {
                Some(_) => scenario,
                None => scenario.with_prior_period_turnover(prior),
            })
            .collect(),
        None => args.scenarios.clone(),
    };

    match (&args.schedule, args.contract) {
        (Some(path), _) => offline(&args, path, &scenarios),
        (None, Some(contract)) => stored(&args, ContractUuid::from_uuid(contract), scenarios).await,
        (None, None) => Err("either --schedule or --contract is required".to_string()),
    }
}

fn offline(
    args: &SimulateArgs,
    path: &Path,
    scenarios: &[TurnoverScenario],
) -> Result<(), String> {
    let config = load_schedule(path)
        .map_err(|error| failure(&format!("failed to load {}", path.display()), &error))?;

    let currency =
        currency_from_code(&args.currency).map_err(|error| failure("invalid currency", &error))?;

    let results = simulate(&config, currency, scenarios, None);

    if args.json {
        return print_json(&OfflineReport {
            currency: currency.iso_alpha_code,
            prior_period_turnover: args.prior_turnover,
            results: &results,
        });
    }

    write_simulation(std::io::stdout().lock(), &results, currency)
        .map_err(|error| failure("failed to write simulation", &error))
}

async fn stored(
    args: &SimulateArgs,
    contract: ContractUuid,
    scenarios: Vec<TurnoverScenario>,
) -> Result<(), String> {
    let (Some(enterprise), Some(database_url)) = (args.enterprise, args.database_url.clone())
    else {
        return Err("--contract needs --enterprise and --database-url".to_string());
    };

    let period = match (args.from, args.to) {
        (Some(from), Some(to)) => {
            Some(Period::new(from, to).map_err(|error| failure("invalid period", &error))?)
        }
        _ => None,
    };

    let ctx = connect(&DatabaseConfig { database_url }).await?;

    let report = ctx
        .calculations
        .simulate(
            EnterpriseUuid::from_uuid(enterprise),
            SimulationRequest {
                contract,
                scenarios,
                period,
            },
        )
        .await
        .map_err(|error| failure("failed to simulate", &error))?;

    if args.json {
        return print_json(&report);
    }

    let currency = currency_from_code(&report.currency)
        .map_err(|error| failure("invalid contract", &error))?;

    if let Some(prior) = report.prior_period_turnover {
        println!("prior_period_turnover: {prior}");
    }

    write_simulation(std::io::stdout().lock(), &report.results, currency)
        .map_err(|error| failure("failed to write simulation", &error))
}
