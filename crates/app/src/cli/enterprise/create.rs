use clap::Args;
use rebates_app::{
    config::DatabaseConfig,
    domain::enterprises::{data::NewEnterprise, records::EnterpriseUuid},
};
use uuid::Uuid;

use crate::cli::{connect, failure};

#[derive(Debug, Args)]
pub(crate) struct CreateEnterpriseArgs {
    #[command(flatten)]
    database: DatabaseConfig,

    /// Enterprise display name
    #[arg(long)]
    name: String,

    /// Optional enterprise UUID; generated when omitted
    #[arg(long)]
    enterprise_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateEnterpriseArgs) -> Result<(), String> {
    let ctx = connect(&args.database).await?;

    let enterprise = ctx
        .enterprises
        .create_enterprise(NewEnterprise {
            uuid: args
                .enterprise_uuid
                .map_or_else(EnterpriseUuid::new, EnterpriseUuid::from_uuid),
            name: args.name,
        })
        .await
        .map_err(|error| failure("failed to create enterprise", &error))?;

    println!("enterprise_uuid: {}", enterprise.uuid);
    println!("enterprise_name: {}", enterprise.name);

    Ok(())
}
