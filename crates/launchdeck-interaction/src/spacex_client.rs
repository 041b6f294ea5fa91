use std::time::Duration;

use async_trait::async_trait;
use launchdeck_core::config::ApiConfig;
use launchdeck_core::error::Result;
use launchdeck_core::{Entity, LaunchdeckError, Page, QueryDescriptor, QueryFetcher};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

const JSON_MIME: &str = "application/json";

/// Client of the SpaceX v4 query API.
///
/// Every call is one `POST {base_url}/{endpoint}/query`. Failures surface as
/// [`LaunchdeckError::Request`]; the client never retries.
#[derive(Clone)]
pub struct SpaceXClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpaceXClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LaunchdeckError::internal(format!("Failed to build HTTP client: {err}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn query_url(&self, descriptor: &QueryDescriptor) -> String {
        format!("{}/{}/query", self.base_url, descriptor.collection.endpoint())
    }

    async fn send_request(&self, descriptor: &QueryDescriptor) -> Result<String> {
        let url = self.query_url(descriptor);
        let body = descriptor.to_body()?;
        tracing::debug!("POST {} {}", url, body);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, JSON_MIME)
            .header(CONTENT_TYPE, JSON_MIME)
            .body(body)
            .send()
            .await
            .map_err(|err| LaunchdeckError::transport(format!("Query request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_error(status));
        }

        response
            .text()
            .await
            .map_err(|err| LaunchdeckError::transport(format!("Failed to read query response: {err}")))
    }
}

impl std::fmt::Debug for SpaceXClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpaceXClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl QueryFetcher for SpaceXClient {
    async fn fetch_page<T: Entity>(&self, descriptor: &QueryDescriptor) -> Result<Page<T>> {
        let text = self.send_request(descriptor).await?;
        let page: Page<T> = serde_json::from_str(&text)?;
        tracing::debug!(
            "Fetched {} {} at offset {} (has next page: {})",
            page.docs.len(),
            descriptor.collection.endpoint(),
            page.offset,
            page.has_next_page
        );
        Ok(page)
    }
}

/// The error message is the status text, like a browser's `statusText`.
fn map_http_error(status: StatusCode) -> LaunchdeckError {
    let message = status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_u16().to_string());
    LaunchdeckError::http_status(status.as_u16(), message)
}
