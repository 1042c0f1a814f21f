use crate::{
    config::LayeredArgs,
    logging::{Logger, LoggerArgs},
    server::{ServerArgs, ServerConfig},
};
use clap::{Args, Parser, Subcommand};
use nasctl_derive::Overlay;
use serde::Deserialize;

mod dataset;

pub use dataset::{create, delete, get};

#[derive(Parser, Debug)]
#[command(name = "nasctl")]
#[command(version, about = "Manage datasets on a FreeNAS storage appliance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Dataset operations
    #[command(subcommand)]
    Dataset(DatasetCommand),
}

#[derive(Subcommand, Debug)]
pub enum DatasetCommand {
    /// Look up a dataset and print it as JSON
    Get(Box<GetArgs>),

    /// Create a dataset; nested names are created under their parent
    Create(Box<CreateArgs>),

    /// Delete a dataset
    Delete(Box<DeleteArgs>),
}

/// Identity of a dataset on the appliance.
#[derive(Args, Debug, Clone)]
pub struct DatasetRef {
    /// Pool containing the dataset
    #[arg(long)]
    pub pool: String,

    /// Dataset path within the pool, e.g. `apps/db`
    #[arg(long)]
    pub name: String,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub target: DatasetRef,

    #[command(flatten)]
    pub connection: LayeredArgs<ConnectionArgs>,
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    #[command(flatten)]
    pub target: DatasetRef,

    /// Mountpoint to request for the new dataset
    #[arg(long)]
    pub mountpoint: Option<String>,

    /// Free-form comment stored with the dataset
    #[arg(long)]
    pub comments: Option<String>,

    #[command(flatten)]
    pub connection: LayeredArgs<ConnectionArgs>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: DatasetRef,

    #[command(flatten)]
    pub connection: LayeredArgs<ConnectionArgs>,
}

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub server: ServerConfig,
    pub logger: Logger,
}

/// Settings shared by every command, layered from the config file, environment and flags.
#[derive(Args, Debug, Clone, Default, Deserialize, Overlay)]
#[nasctl(try_into = "ConnectionConfig")]
pub struct ConnectionArgs {
    #[command(flatten, next_help_heading = "Appliance Connection")]
    #[serde(flatten)]
    pub server: ServerArgs,

    #[command(flatten, next_help_heading = "Logging")]
    #[serde(flatten)]
    pub logger: LoggerArgs,
}

/// Writes `value` to stdout as pretty JSON.
fn print_json<T: serde::Serialize>(value: &T) -> Result<(), crate::error::NasError> {
    use std::io::Write;
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
