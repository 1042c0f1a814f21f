//! Dataset resource.
//!
//! A dataset is a named, hierarchical storage unit inside a pool. It is
//! identified by the exact `(pool, name)` pair, where `name` is the
//! `/`-delimited path of the dataset below the pool root.

use super::{Resource, ResourceError, body_text};
use crate::server::StorageServer;
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tracing::{debug, info};

/// Upper bound on datasets requested per listing; the server default page is 20.
pub(crate) const LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub pool: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mountpoint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comments: String,
    /// Bytes available
    #[serde(rename = "avail", skip_serializing_if = "is_zero")]
    pub available: i64,
    /// Bytes referenced
    #[serde(rename = "refer", skip_serializing_if = "is_zero")]
    pub referenced: i64,
    /// Bytes used
    #[serde(skip_serializing_if = "is_zero")]
    pub used: i64,
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

impl Dataset {
    pub fn new(pool: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mountpoint(mut self, mountpoint: impl Into<String>) -> Self {
        self.mountpoint = mountpoint.into();
        self
    }

    pub fn with_comments(mut self, comments: impl Into<String>) -> Self {
        self.comments = comments.into();
        self
    }

    fn matches(&self, other: &Dataset) -> bool {
        self.pool == other.pool && self.name == other.name
    }

    fn list_endpoint(&self) -> Result<Vec<&str>, ResourceError> {
        let pool = segment(&self.pool, &self.pool)?;
        Ok(vec!["api", "v1.0", "storage", "volume", pool, "datasets"])
    }

    fn create_endpoint<'a>(&'a self, parent: &[&'a str]) -> Result<Vec<&'a str>, ResourceError> {
        let pool = segment(&self.pool, &self.pool)?;
        let mut path = vec!["api", "v1.0", "storage", "dataset", pool];
        path.extend_from_slice(parent);
        Ok(path)
    }

    fn delete_endpoint(&self) -> Result<Vec<&str>, ResourceError> {
        let pool = segment(&self.pool, &self.pool)?;
        let (parent, leaf) = split_name(&self.name)?;
        let mut path = vec!["api", "v1.0", "storage", "volume", pool, "datasets"];
        path.extend(parent);
        path.push(leaf);
        Ok(path)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = self.name.trim_start_matches('/');
        if name.is_empty() {
            write!(f, "{}", self.pool)
        } else {
            write!(f, "{}/{}", self.pool.trim_end_matches('/'), name)
        }
    }
}

/// Accepts `value` as a single API path segment; `full` is reported on error.
fn segment<'a>(value: &'a str, full: &str) -> Result<&'a str, ResourceError> {
    match value {
        "" | "." | ".." => Err(ResourceError::InvalidName(full.to_string())),
        v if v.contains('/') => Err(ResourceError::InvalidName(full.to_string())),
        v => Ok(v),
    }
}

/// Splits a dataset path into its parent segments and leaf name.
///
/// `"a/b/c"` yields `(["a", "b"], "c")`. Empty parent segments are dropped,
/// while an empty leaf or a `.`/`..` segment anywhere is an error.
pub(crate) fn split_name(name: &str) -> Result<(Vec<&str>, &str), ResourceError> {
    let (parent, leaf) = name.rsplit_once('/').unwrap_or(("", name));
    let parent = parent
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| segment(s, name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((parent, segment(leaf, name)?))
}

#[async_trait]
impl Resource for Dataset {
    fn kind(&self) -> &'static str {
        "dataset"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn fetch(&mut self, server: &StorageServer) -> Result<(), ResourceError> {
        let endpoint = self.list_endpoint()?;
        let resp = server
            .request(Method::GET, &endpoint)
            .query(&[("limit", LIST_LIMIT)])
            .send()
            .await
            .map_err(ResourceError::transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ResourceError::UnexpectedStatus {
                action: "listing datasets in",
                resource: self.pool.clone(),
                status,
                body: body_text(resp).await,
            });
        }

        let datasets: Vec<Dataset> = resp.json().await.map_err(ResourceError::transport)?;
        debug!(pool = %self.pool, count = datasets.len(), "received dataset listing");

        let found = datasets
            .into_iter()
            .find(|ds| self.matches(ds))
            .ok_or_else(|| ResourceError::NotFound(self.to_string()))?;

        self.mountpoint = found.mountpoint;
        self.comments = found.comments;
        self.available = found.available;
        self.referenced = found.referenced;
        self.used = found.used;
        Ok(())
    }

    async fn create(&mut self, server: &StorageServer) -> Result<(), ResourceError> {
        let (parent, leaf) = split_name(&self.name)?;
        let endpoint = self.create_endpoint(&parent)?;
        let body = Dataset {
            name: leaf.to_string(),
            ..self.clone()
        };

        let resp = server
            .request(Method::POST, &endpoint)
            .json(&body)
            .send()
            .await
            .map_err(ResourceError::transport)?;

        let status = resp.status();
        if status != StatusCode::CREATED {
            return Err(ResourceError::UnexpectedStatus {
                action: "creating dataset",
                resource: self.to_string(),
                status,
                body: body_text(resp).await,
            });
        }

        info!(dataset = %self, "created dataset");
        // The server addresses the new dataset by its endpoint; only the leaf is kept.
        self.name = body.name;
        Ok(())
    }

    async fn delete(&self, server: &StorageServer) -> Result<(), ResourceError> {
        let endpoint = self.delete_endpoint()?;
        let resp = server
            .request(Method::DELETE, &endpoint)
            .send()
            .await
            .map_err(ResourceError::transport)?;

        let status = resp.status();
        if status != StatusCode::NO_CONTENT {
            return Err(ResourceError::UnexpectedStatus {
                action: "deleting dataset",
                resource: format!("{:?}", self),
                status,
                body: body_text(resp).await,
            });
        }

        info!(dataset = %self, "deleted dataset");
        Ok(())
    }

    fn copy_from(&mut self, source: &dyn Resource) -> Result<(), ResourceError> {
        let src = source
            .as_any()
            .downcast_ref::<Dataset>()
            .ok_or(ResourceError::TypeMismatch {
                expected: self.kind(),
                found: source.kind(),
            })?;
        self.clone_from(src);
        Ok(())
    }
}
