//! Layered configuration.
//!
//! Every command reads an optional TOML file as its base layer, and
//! values from the command line or environment are overlaid on top.
//! Partial `*Args` structs derive [`Overlay`] through `nasctl_derive`, which also
//! generates [`ApplyDefaults`] and a validating conversion into the final config.
use crate::error::NasError;
use clap::Args;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Validation(String),
}

/// Trait for merging two partial structs.
pub trait Overlay {
    /// self is the base layer, over is the top layer.
    fn overlay(self, over: Self) -> Self;
}

// If top layer exists, use it. Otherwise keep base.
impl<T> Overlay for Option<T> {
    fn overlay(self, over: Self) -> Self {
        over.or(self)
    }
}

/// Trait for applying configured default values to optional fields.
pub trait ApplyDefaults {
    fn apply_defaults(self) -> Self;
}

/// Wraps a partial argument struct with the `--config` file that forms its base layer.
#[derive(Args, Debug, Clone)]
pub struct LayeredArgs<T: Args> {
    /// Path to a TOML configuration file
    #[arg(long, env = "NASCTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub inner: T,
}

impl<T> LayeredArgs<T>
where
    T: Args,
{
    pub fn load<C>(self) -> Result<C, NasError>
    where
        T: Layered<C>,
    {
        self.inner.resolve(self.config.as_deref())
    }
}

pub trait Layered<C>: Overlay + DeserializeOwned + Default + Sized {
    fn resolve(self, config_path: Option<&Path>) -> Result<C, NasError>;
}

impl<T, C> Layered<C> for T
where
    T: Overlay + DeserializeOwned + Default,
    T: TryInto<C>,
    <T as TryInto<C>>::Error: Into<NasError>,
{
    fn resolve(self, config_path: Option<&Path>) -> Result<C, NasError> {
        let base = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str::<Self>(&content).map_err(ConfigError::Parse)?
            }
            None => Self::default(),
        };

        base.overlay(self).try_into().map_err(Into::into)
    }
}
