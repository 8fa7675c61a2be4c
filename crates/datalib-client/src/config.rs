//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

/// Default page size when a view does not choose one.
pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how to reach the API.
///
/// The base URL is configured out of band (flag, environment, embedding
/// application); a config without one can be constructed, but any fetch
/// against it fails with [`ClientError::Configuration`] at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub page_limit: u32,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            page_limit: DEFAULT_PAGE_LIMIT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured base URL, or the configuration error every fetch
    /// surfaces when it is missing.
    pub fn require_base_url(&self) -> Result<&str> {
        match self.base_url.as_deref() {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => Err(ClientError::Configuration(
                "set the API base URL before fetching".to_string(),
            )),
        }
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<String> {
        let base = self.require_base_url()?;
        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        ))
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
