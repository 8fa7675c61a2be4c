//! The HTTP API client.

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};

use datalib_model::{ListPage, Record};

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};

/// User agent string for API requests.
const USER_AGENT_VALUE: &str = concat!("datalib/", env!("CARGO_PKG_VERSION"));

/// Thin typed client over the dashboard API.
///
/// All endpoints take the flat parameter list produced by the query
/// parameter builder and answer JSON. Requests are idempotent reads; there
/// is no retry and no transport-level cancellation; superseded responses
/// are discarded by the list controller on arrival.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Fetches one page of list results.
    pub async fn fetch_page(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<ListPage> {
        let url = self.config.endpoint_url(endpoint)?;
        tracing::debug!(%url, params = params.len(), "fetching list page");
        let response = self.http.get(&url).query(params).send().await?;
        Self::decode(response).await
    }

    /// Fetches a summary endpoint: a flat object of labeled counts.
    pub async fn fetch_summary(&self, endpoint: &str) -> Result<Record> {
        let url = self.config.endpoint_url(endpoint)?;
        tracing::debug!(%url, "fetching summary");
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    /// Probes an endpoint for one record, used to discover columns not in
    /// the static catalog. A missing or empty first page is `None`, not an
    /// error.
    pub async fn sample_record(&self, endpoint: &str) -> Result<Option<Record>> {
        let params = vec![
            ("page".to_string(), "1".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        let page = self.fetch_page(endpoint, &params).await?;
        Ok(page.data.into_iter().next())
    }

    /// Maps a response to its JSON payload, turning non-2xx statuses into
    /// an error carrying the server's reason text.
    async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            let reason = if reason.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                reason
            };
            return Err(ClientError::Status {
                status: status.as_u16(),
                reason,
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_without_a_base_url() {
        // Construction succeeds; the configuration error is raised at
        // fetch call time, not here.
        let client = ApiClient::new(ApiConfig::default()).expect("client");
        assert!(client.config().base_url.is_none());
    }
}
