//! Client configuration.
//!
//! Driven by the same environment variables the AWS SDKs read. Settings from
//! lower-precedence sources (the SDK's profile region, a config file) are
//! applied to a [`ClientConfig`] first and the environment is layered on top
//! with [`ClientConfig::with_env`].

use std::env;
use std::time::Duration;

use tracing::warn;

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach DynamoDB.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Endpoint override, e.g. `http://localhost:8000`. `None` means the
    /// regional AWS endpoint.
    pub endpoint_url: Option<String>,
    /// Signing region.
    pub region: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint_url: None,
            region: DEFAULT_REGION.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Override fields with the environment variables that are set.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `AWS_ENDPOINT_URL_DYNAMODB`, then `AWS_ENDPOINT_URL` | `endpoint_url` |
    /// | `AWS_REGION`, then `AWS_DEFAULT_REGION` | `region` |
    /// | `DDB_TIMEOUT_SECS` | `timeout` |
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| env::var(key).ok())
    }

    /// Override fields through an arbitrary variable lookup. Unset and empty
    /// variables leave the field as it is.
    #[must_use]
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| lookup(key).filter(|v| !v.is_empty()))
        };

        if let Some(v) = first(&["AWS_ENDPOINT_URL_DYNAMODB", "AWS_ENDPOINT_URL"]) {
            self.endpoint_url = Some(v);
        }
        if let Some(v) = first(&["AWS_REGION", "AWS_DEFAULT_REGION"]) {
            self.region = v;
        }
        if let Some(v) = first(&["DDB_TIMEOUT_SECS"]) {
            match v.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout = Duration::from_secs(secs),
                _ => warn!(value = %v, "Ignoring invalid DDB_TIMEOUT_SECS"),
            }
        }
        self
    }

    /// The URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        match &self.endpoint_url {
            Some(url) => url.trim_end_matches('/').to_owned(),
            None => format!("https://dynamodb.{}.amazonaws.com", self.region),
        }
    }
}
