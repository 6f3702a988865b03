use clap::Args;
use rebates_app::domain::contracts::{
    data::NewTurnover,
    records::{ContractUuid, TurnoverUuid},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::cli::{EnterpriseScope, PeriodArgs, failure};

#[derive(Debug, Args)]
pub(crate) struct RecordTurnoverArgs {
    #[command(flatten)]
    scope: EnterpriseScope,

    /// Contract UUID
    #[arg(long)]
    contract: Uuid,

    #[command(flatten)]
    period: PeriodArgs,

    /// Turnover achieved over the period
    #[arg(long)]
    amount: Decimal,
}

pub(crate) async fn run(args: RecordTurnoverArgs) -> Result<(), String> {
    let period = args.period.period()?;
    let ctx = args.scope.connect().await?;

    let turnover = ctx
        .contracts
        .record_turnover(
            args.scope.enterprise(),
            ContractUuid::from_uuid(args.contract),
            NewTurnover {
                uuid: TurnoverUuid::new(),
                period,
                amount: args.amount,
            },
        )
        .await
        .map_err(|error| failure("failed to record turnover", &error))?;

    println!("turnover_uuid: {}", turnover.uuid);
    println!("period: {}", turnover.period);
    println!("amount: {}", turnover.amount);

    Ok(())
}
