use clap::{Args, Subcommand};

mod create;

#[derive(Debug, Args)]
pub(crate) struct EnterpriseCommand {
    #[command(subcommand)]
    command: EnterpriseSubcommand,
}

#[derive(Debug, Subcommand)]
enum EnterpriseSubcommand {
    Create(create::CreateEnterpriseArgs),
}

pub(crate) async fn run(command: EnterpriseCommand) -> Result<(), String> {
    match command.command {
        EnterpriseSubcommand::Create(args) => create::run(args).await,
    }
}
