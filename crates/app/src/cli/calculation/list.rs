use clap::Args;
use jiff::civil::Date;
use rebates_app::domain::{
    calculations::{data::CalculationFilters, records::CalculationStatus},
    contracts::records::ContractUuid,
};
use uuid::Uuid;

use crate::cli::{EnterpriseScope, failure, print_json};

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Only this contract's calculations
    #[arg(long)]
    contract: Option<Uuid>,

    /// Only calculations in this status (draft, final)
    #[arg(long)]
    status: Option<CalculationStatus>,

    /// Only periods starting on or after this date
    #[arg(long)]
    from: Option<Date>,

    /// Only periods ending on or before this date
    #[arg(long)]
    to: Option<Date>,

    /// Print records as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: ListArgs) -> Result<(), String> {
    let ctx = args.scope.connect().await?;

    let records = ctx
        .calculations
        .list_calculations(
            args.scope.enterprise(),
            CalculationFilters {
                contract: args.contract.map(ContractUuid::from_uuid),
                status: args.status,
                from: args.from,
                to: args.to,
            },
        )
        .await
        .map_err(|error| failure("failed to list calculations", &error))?;

    if args.json {
        return print_json(&records);
    }

    for record in &records {
        println!(
            "{}  {}  {:<5}  {} {}  (rate {})",
            record.uuid,
            record.period,
            record.status,
            record.total_rebate,
            record.currency,
            record.effective_rate,
        );
    }

    Ok(())
}
