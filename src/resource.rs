//! Remote resource abstractions.
//!
//! This module defines the [`Resource`] trait, which every resource exposed by
//! the appliance API implements. A resource value is a transient local
//! projection of remote state: callers construct it, run one operation against
//! a [`StorageServer`], and discard it. Nothing is cached between calls.
use crate::server::StorageServer;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::any::Any;
use thiserror::Error;

pub mod dataset;

pub use dataset::Dataset;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// The listing did not contain the requested resource
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Network, connection, or response decoding failure
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server answered with a status other than the documented success code
    #[error("error {action} {resource}: status {status}: {body}")]
    UnexpectedStatus {
        action: &'static str,
        resource: String,
        status: StatusCode,
        body: String,
    },

    /// `copy_from` was given a different resource variant
    #[error("cannot copy, source is a {found} and not a {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The pool or name cannot be addressed as API path segments
    #[error("invalid resource name: '{0}'")]
    InvalidName(String),
}

impl ResourceError {
    /// Wraps a transport failure, logging it before it is propagated.
    pub(crate) fn transport(e: reqwest::Error) -> Self {
        tracing::warn!(error = %e, "appliance request failed");
        ResourceError::Transport(Box::new(e))
    }
}

/// Capabilities shared by every resource the appliance exposes.
#[async_trait]
pub trait Resource: Any + Send + Sync {
    /// Short name of the resource variant, used in error messages.
    fn kind(&self) -> &'static str;

    /// Allows `copy_from` implementations to downcast their source.
    fn as_any(&self) -> &dyn Any;

    /// Refreshes this value from the server, matching on its identity fields.
    async fn fetch(&mut self, server: &StorageServer) -> Result<(), ResourceError>;

    /// Creates the resource on the server.
    async fn create(&mut self, server: &StorageServer) -> Result<(), ResourceError>;

    /// Deletes the resource from the server.
    async fn delete(&self, server: &StorageServer) -> Result<(), ResourceError>;

    /// Overwrites every field of this value from a resource of the same variant.
    fn copy_from(&mut self, source: &dyn Resource) -> Result<(), ResourceError>;
}

/// Reads a response body for inclusion in an error, never failing.
pub(crate) async fn body_text(resp: reqwest::Response) -> String {
    match resp.text().await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "failed to read response body");
            String::new()
        }
    }
}
