use super::{ConnectionConfig, CreateArgs, DatasetRef, DeleteArgs, GetArgs, print_json};
use crate::{
    error::NasError,
    resource::{Dataset, Resource},
    server::StorageServer,
};
use tracing::{debug, info};

impl From<DatasetRef> for Dataset {
    fn from(target: DatasetRef) -> Self {
        Dataset::new(target.pool, target.name)
    }
}

async fn connect(config: ConnectionConfig) -> Result<StorageServer, NasError> {
    config.logger.init()?;
    debug!("effective server config: {:#?}", config.server);
    Ok(StorageServer::new(config.server).await?)
}

pub async fn get(args: GetArgs) -> Result<(), NasError> {
    let server = connect(args.connection.load()?).await?;

    let mut dataset = Dataset::from(args.target);
    dataset.fetch(&server).await?;

    print_json(&dataset)
}

pub async fn create(args: CreateArgs) -> Result<(), NasError> {
    let server = connect(args.connection.load()?).await?;

    let mut dataset = Dataset::from(args.target);
    if let Some(mountpoint) = args.mountpoint {
        dataset = dataset.with_mountpoint(mountpoint);
    }
    if let Some(comments) = args.comments {
        dataset = dataset.with_comments(comments);
    }

    info!(dataset = %dataset, "creating dataset");
    dataset.create(&server).await?;

    print_json(&dataset)
}

pub async fn delete(args: DeleteArgs) -> Result<(), NasError> {
    let server = connect(args.connection.load()?).await?;

    let dataset = Dataset::from(args.target);
    dataset.delete(&server).await?;
    Ok(())
}
