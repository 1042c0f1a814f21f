//! Connection to the storage appliance REST API.
//!
//! [`StorageServer`] owns a configured HTTP client bound to the appliance
//! base URL and credentials. Resources use it to build requests; it does not
//! interpret responses.
use clap::Args;
use nasctl_derive::Overlay;
use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

mod types;

pub use types::{Password, PasswordSource, RequestTimeout};

#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid or missing configuration
    #[error("invalid server config: {0}")]
    InvalidConfig(String),

    /// The HTTP client could not be constructed
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub url: Url,
    pub username: String,
    pub password: Password,
    pub timeout: RequestTimeout,
    pub insecure: bool,
}

#[derive(Args, Debug, Clone, Default, Deserialize, Overlay)]
#[serde(rename_all = "kebab-case")]
#[nasctl(try_into = "ServerConfig")]
pub struct ServerArgs {
    /// Base URL of the appliance, e.g. `https://nas.local`
    #[arg(long, env = "NASCTL_URL")]
    pub url: Option<Url>,

    /// User for HTTP basic auth
    #[arg(long, env = "NASCTL_USERNAME")]
    #[nasctl(default = "root")]
    pub username: Option<String>,

    /// Password for HTTP basic auth
    ///
    /// Either provide the password directly or via a file with `file:` prefix
    #[arg(long, env = "NASCTL_PASSWORD", hide_env_values = true)]
    pub password: Option<Password>,

    /// Request timeout.
    ///
    /// Handles human-readable strings like "500ms", "30s", etc.
    /// Unitless numbers are interpreted as seconds.
    #[arg(long, env = "NASCTL_TIMEOUT")]
    #[nasctl(default = RequestTimeout::default())]
    pub timeout: Option<RequestTimeout>,

    /// Skip TLS certificate verification (self-signed appliances)
    #[arg(long, env = "NASCTL_INSECURE", num_args = 0..=1, default_missing_value = "true")]
    #[nasctl(default = false)]
    pub insecure: Option<bool>,
}

/// An authenticated HTTP client bound to one appliance.
pub struct StorageServer {
    client: Client,
    base: Url,
    username: String,
    password: SecretString,
}

impl std::fmt::Debug for StorageServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageServer")
            .field("base", &self.base.as_str())
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl StorageServer {
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        if config.url.cannot_be_a_base() {
            return Err(ServerError::InvalidConfig(format!(
                "url '{}' cannot be used as a base",
                config.url
            )));
        }

        let password = config.password.resolve().await?;

        let client = Client::builder()
            .timeout(config.timeout.into())
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(ServerError::Client)?;

        Ok(Self {
            client,
            base: config.url,
            username: config.username,
            password,
        })
    }

    /// Builds the URL of an API path from its segments.
    ///
    /// Each segment is percent-encoded on its own, so `/`, `?` and `#` inside a
    /// segment never change the path structure. Any path on the base URL is
    /// replaced and the result always ends with `/`.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejects cannot-be-a-base URLs, so the path is always mutable.
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments).push("");
        }
        url
    }

    /// Starts an authenticated request to the API path made of `segments`.
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "building request");
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
    }
}
