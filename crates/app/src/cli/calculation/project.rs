use clap::Args;
use jiff::{Zoned, civil::Date};
use rebates::{currency::currency_from_code, report::write_breakdown};
use rebates_app::domain::{
    calculations::data::ProjectionRequest, contracts::records::ContractUuid,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::{EnterpriseScope, PeriodArgs, failure, print_json};

#[derive(Debug, Args)]
pub(crate) struct ProjectArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Contract UUID
    #[arg(long)]
    contract: Uuid,

    #[command(flatten)]
    period: PeriodArgs,

    /// Turnover achieved so far
    #[arg(long)]
    turnover_to_date: Decimal,

    /// Date the turnover was observed; today when omitted
    #[arg(long)]
    as_of: Option<Date>,

    /// Print the projection as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: ProjectArgs) -> Result<(), String> {
    let period = args.period.period()?;
    let ctx = args.scope.connect().await?;

    let projected = ctx
        .calculations
        .project(
            args.scope.enterprise(),
            ProjectionRequest {
                contract: ContractUuid::from_uuid(args.contract),
                period,
                turnover_to_date: args.turnover_to_date,
                as_of: args.as_of.unwrap_or_else(|| Zoned::now().date()),
            },
        )
        .await
        .map_err(|error| failure("failed to project rebate", &error))?;

    if args.json {
        return print_json(&projected);
    }

    let currency = currency_from_code(&projected.currency)
        .map_err(|error| failure("invalid contract", &error))?;

    let projection = &projected.projection;

    println!("period: {}", projection.period);
    println!("as_of: {}", projection.as_of);
    println!(
        "progress: {} ({} of {} days)",
        projection.progress, projection.days_elapsed, projection.total_days
    );
    println!("turnover_to_date: {}", projection.turnover_to_date);
    println!("current_rebate: {}", projected.current.total_rebate);
    println!("projected_turnover: {}", projection.projected_turnover);

    write_breakdown(std::io::stdout().lock(), &projected.projected, currency)
        .map_err(|error| failure("failed to write breakdown", &error))
}
