use clap::{Args, Subcommand};

mod record;

#[derive(Debug, Args)]
pub(crate) struct TurnoverCommand {
    #[command(subcommand)]
    command: TurnoverSubcommand,
}

#[derive(Debug, Subcommand)]
enum TurnoverSubcommand {
    Record(record::RecordTurnoverArgs),
}

pub(crate) async fn run(command: TurnoverCommand) -> Result<(), String> {
    match command.command {
        TurnoverSubcommand::Record(args) => record::run(args).await,
    }
}
