use clap::Args;
use rebates_app::domain::contracts::records::ContractUuid;
use uuid::Uuid;

use crate::cli::{EnterpriseScope, failure};

use super::{ScheduleSource, print_contract};

/// Replace a contract's discount schedules. Existing calculations keep the
/// schedule they were calculated with.
#[derive(Debug, Args)]
pub(crate) struct ScheduleArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Contract UUID
    #[arg(long)]
    contract: Uuid,

    #[command(flatten)]
    schedules: ScheduleSource,
}

pub(crate) async fn run(args: ScheduleArgs) -> Result<(), String> {
    let discount_configs = args.schedules.load()?;
    let ctx = args.scope.connect().await?;

    let contract = ctx
        .contracts
        .update_discount_configs(
            args.scope.enterprise(),
            ContractUuid::from_uuid(args.contract),
            discount_configs,
        )
        .await
        .map_err(|error| failure("failed to update schedules", &error))?;

    print_contract(&contract);

    Ok(())
}
