//! Value types used by the server configuration.

use super::ServerError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Where the appliance password comes from.
#[derive(Debug, Clone)]
pub enum PasswordSource {
    Literal(SecretString),
    File(PathBuf),
}

/// Password for HTTP basic auth against the appliance.
///
/// Parsed from either a literal value or `file:/path/to/secret`.
/// Debug output never contains the secret.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Password(PasswordSource);

impl Password {
    /// Resolves the password, reading it from disk when file backed.
    pub async fn resolve(&self) -> Result<SecretString, ServerError> {
        match &self.0 {
            PasswordSource::Literal(s) => Ok(s.clone()),
            PasswordSource::File(path) => {
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    ServerError::InvalidConfig(format!(
                        "failed to read password file {:?}: {}",
                        path, e
                    ))
                })?;
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    return Err(ServerError::InvalidConfig(format!(
                        "password file {:?} is empty",
                        path
                    )));
                }
                Ok(SecretString::new(trimmed.to_owned().into()))
            }
        }
    }
}

impl TryFrom<String> for Password {
    type Error = ServerError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Password {
    type Err = ServerError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ServerError::InvalidConfig("password is empty".to_string()));
        }
        match s.strip_prefix("file:") {
            Some(path) => {
                let cleaned = path.strip_prefix("//").unwrap_or(path);
                Ok(Self(PasswordSource::File(PathBuf::from(cleaned))))
            }
            None => Ok(Self(PasswordSource::Literal(SecretString::new(
                s.to_owned().into(),
            )))),
        }
    }
}

impl PartialEq for PasswordSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Literal(l), Self::Literal(r)) => l.expose_secret() == r.expose_secret(),
            (Self::File(l), Self::File(r)) => l == r,
            _ => false,
        }
    }
}

/// Timeout applied to every request issued by the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(pub Duration);

/// Defaults to seconds if no unit specified, otherwise uses humantime parsing.
impl FromStr for RequestTimeout {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(secs) = s.parse::<u64>() {
            return Ok(RequestTimeout(Duration::from_secs(secs)));
        }
        humantime::parse_duration(s).map(RequestTimeout)
    }
}

impl<'de> Deserialize<'de> for RequestTimeout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Secs(u64),
            Human(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(RequestTimeout(Duration::from_secs(secs))),
            Raw::Human(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

impl std::fmt::Display for RequestTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", humantime::format_duration(self.0))
    }
}

impl From<RequestTimeout> for Duration {
    fn from(val: RequestTimeout) -> Self {
        val.0
    }
}

impl Default for RequestTimeout {
    fn default() -> Self {
        RequestTimeout(Duration::from_secs(10))
    }
}
