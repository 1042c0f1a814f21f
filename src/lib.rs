//! # nasctl
//!
//! `nasctl` is a client library and command line tool for managing datasets on
//! a FreeNAS storage appliance through its v1.0 REST API.
//!
//! Resources are modelled as plain local values implementing [`resource::Resource`].
//! Each operation queries or mutates the appliance through a
//! [`server::StorageServer`] and updates the local value only on success.
//!
//! ```no_run
//! # async fn demo(config: nasctl::server::ServerConfig) -> Result<(), nasctl::error::NasError> {
//! use nasctl::resource::{Dataset, Resource};
//! use nasctl::server::StorageServer;
//!
//! let server = StorageServer::new(config).await?;
//! let mut dataset = Dataset::new("tank", "apps/db");
//! dataset.fetch(&server).await?;
//! println!("{} uses {} bytes", dataset, dataset.used);
//! # Ok(())
//! # }
//! ```
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod resource;
pub mod server;
