use clap::Args;
use rebates_app::domain::{
    calculations::{data::NewCalculation, records::CalculationUuid},
    contracts::records::ContractUuid,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::{EnterpriseScope, PeriodArgs, failure};

use super::print_calculation;

#[derive(Debug, Args)]
pub(crate) struct CreateCalculationArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Contract UUID
    #[arg(long)]
    contract: Uuid,

    #[command(flatten)]
    period: PeriodArgs,

    /// Turnover achieved over the period
    #[arg(long)]
    turnover: Decimal,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: CreateCalculationArgs) -> Result<(), String> {
    let period = args.period.period()?;
    let ctx = args.scope.connect().await?;

    let record = ctx
        .calculations
        .create_calculation(
            args.scope.enterprise(),
            NewCalculation {
                uuid: CalculationUuid::new(),
                contract: ContractUuid::from_uuid(args.contract),
                period,
                achieved_turnover: args.turnover,
            },
        )
        .await
        .map_err(|error| failure("failed to create calculation", &error))?;

    print_calculation(&record, args.json)
}
