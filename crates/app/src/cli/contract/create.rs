use clap::Args;
use jiff::civil::Date;
use rebates_app::domain::contracts::{data::NewContract, records::ContractUuid};
use uuid::Uuid;

use crate::cli::{EnterpriseScope, failure};

use super::{ScheduleSource, print_contract};

#[derive(Debug, Args)]
pub(crate) struct CreateContractArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Contract display name
    #[arg(long)]
    name: String,

    /// ISO 4217 currency code rebates are paid in
    #[arg(long, default_value = "EUR")]
    currency: String,

    /// Contract start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Date,

    /// Optional contract end date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<Date>,

    #[command(flatten)]
    schedules: ScheduleSource,

    /// Optional contract UUID; generated when omitted
    #[arg(long)]
    contract_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateContractArgs) -> Result<(), String> {
    let discount_configs = args.schedules.load()?;
    let ctx = args.scope.connect().await?;

    let contract = ctx
        .contracts
        .create_contract(
            args.scope.enterprise(),
            NewContract {
                uuid: args
                    .contract_uuid
                    .map_or_else(ContractUuid::new, ContractUuid::from_uuid),
                name: args.name,
                currency: args.currency,
                discount_configs,
                start_date: args.start_date,
                end_date: args.end_date,
            },
        )
        .await
        .map_err(|error| failure("failed to create contract", &error))?;

    print_contract(&contract);

    Ok(())
}
