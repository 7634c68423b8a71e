//! HTTP client abstraction for testability

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::types::{HttpMethod, HttpRequest, HttpResponse, ProviderError};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Trait for async HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Implementations return the raw
/// status and body; mapping statuses to errors is done by
/// [`classify`](super::classify) so that a 429 and a 500 stay distinguishable.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs the request.
    ///
    /// Transport-level failures (timeout, DNS, refused connection) are
    /// reported as [`ProviderError::Unavailable`].
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send;
}

impl<T: AsyncHttpClient> AsyncHttpClient for Arc<T> {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, ProviderError>> + Send {
        (**self).execute(request)
    }
}

/// Real async HTTP client implementation using reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new(user_agent: &str) -> Result<Self, ProviderError> {
        Self::with_timeout(user_agent, DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(user_agent: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| ProviderError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url).query(&request.params),
            HttpMethod::PostForm => self.client.post(&request.url).form(&request.params),
        };
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();

        // Read response body
        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}
