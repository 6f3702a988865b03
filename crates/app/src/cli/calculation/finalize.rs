use clap::Args;
use rebates_app::domain::calculations::records::CalculationUuid;
use uuid::Uuid;

use crate::cli::{EnterpriseScope, failure};

use super::print_calculation;

#[derive(Debug, Args)]
pub(crate) struct FinalizeArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Calculation UUID
    #[arg(long)]
    calculation: Uuid,

    /// Print the finalised record as JSON
    #[arg(long)]
    json: bool,
}

pub(crate) async fn run(args: FinalizeArgs) -> Result<(), String> {
    let ctx = args.scope.connect().await?;

    let record = ctx
        .calculations
        .finalize_calculation(
            args.scope.enterprise(),
            CalculationUuid::from_uuid(args.calculation),
        )
        .await
        .map_err(|error| failure("failed to finalise calculation", &error))?;

    print_calculation(&record, args.json)
}
