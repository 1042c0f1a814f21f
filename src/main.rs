use clap::Parser;
use nasctl::cmd::{self, Cli, Command, DatasetCommand};
use std::process::{ExitCode, Termination};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Dataset(DatasetCommand::Get(args)) => cmd::get(*args).await,
        Command::Dataset(DatasetCommand::Create(args)) => cmd::create(*args).await,
        Command::Dataset(DatasetCommand::Delete(args)) => cmd::delete(*args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => e.report(),
    }
}
