//! HttpSearchClient - full-text search over HTTP
//!
//! `POST {host}/api/index/{index}/query` with basic auth and a JSON body.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use contracts::{EndpointConfig, ErrorDetail, QueryBlob, RemoteCaller, SearchResult};
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::error::{Result, SearchClientError};

/// Connection settings for [`HttpSearchClient`]
#[derive(Clone)]
pub struct HttpSearchConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub index: String,
    pub timeout: Duration,
}

impl From<&EndpointConfig> for HttpSearchConfig {
    fn from(endpoint: &EndpointConfig) -> Self {
        Self {
            base_url: endpoint.host.clone(),
            username: endpoint.username.clone(),
            password: endpoint.password.clone(),
            index: endpoint.index.clone(),
            timeout: Duration::from_secs(endpoint.timeout_secs),
        }
    }
}

/// RemoteCaller backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct HttpSearchClient {
    name: String,
    client: reqwest::Client,
    url: String,
    auth: HeaderValue,
    timeout: Duration,
}

impl HttpSearchClient {
    /// Build a client for one index
    pub fn new(config: HttpSearchConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let auth = basic_auth_header(&config.username, &config.password)?;
        let url = format!(
            "{}/api/index/{}/query",
            config.base_url.trim_end_matches('/'),
            config.index
        );

        debug!(url = %url, timeout_ms = config.timeout.as_millis() as u64, "Search client ready");

        Ok(Self {
            name: format!("http:{}", config.index),
            client,
            url,
            auth,
            timeout: config.timeout,
        })
    }

    /// Query endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, e: reqwest::Error) -> ErrorDetail {
        if e.is_timeout() {
            ErrorDetail::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }
        } else {
            ErrorDetail::transport(e.to_string())
        }
    }
}

fn basic_auth_header(username: &str, password: &str) -> Result<HeaderValue> {
    let token = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {token}")).map_err(|_| {
        SearchClientError::InvalidCredentials {
            username: username.to_string(),
        }
    })?;
    value.set_sensitive(true);
    Ok(value)
}

impl RemoteCaller for HttpSearchClient {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "http_search_call",
        skip(self, blob),
        fields(position = blob.position(), bytes = blob.len())
    )]
    async fn call(&self, blob: &QueryBlob) -> std::result::Result<SearchResult, ErrorDetail> {
        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, self.auth.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(blob.body().clone())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        if status != StatusCode::OK {
            return Err(ErrorDetail::status(
                status.as_u16(),
                String::from_utf8_lossy(&body),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| ErrorDetail::decode(e.to_string()))
    }
}
