//! Request, response, and error types for upstream geodata hosts.

use thiserror::Error;

/// Errors from a single upstream request.
///
/// The variants mirror how the prefetch loop classifies a sample point's
/// outcome: everything except `ClientBuild` is a per-point failure that the
/// loop logs and skips.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// Upstream answered HTTP 429.
    #[error("Rate limited by {url}")]
    RateLimited { url: String },

    /// Upstream answered with a non-2xx status other than 429.
    #[error("HTTP {status} from {url}")]
    RequestFailed { status: u16, url: String },

    /// Transport failure: timeout, DNS, connection refused, truncated body.
    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    /// A 2xx body that is not the expected JSON document.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The caller cancelled while waiting or while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

/// HTTP method plus how `params` are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET with `params` as the query string.
    Get,
    /// POST with `params` as an `application/x-www-form-urlencoded` body.
    PostForm,
}

/// A fully described outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn post_form(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::PostForm,
            url: url.into(),
            params: Vec::new(),
            headers: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Look up the first parameter with the given key.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw status and body of a completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Turn a raw response into its body, or the matching per-point error.
pub fn classify(response: HttpResponse, url: &str) -> Result<Vec<u8>, ProviderError> {
    match response.status {
        s if (200..300).contains(&s) => Ok(response.body),
        429 => Err(ProviderError::RateLimited {
            url: url.to_string(),
        }),
        status => Err(ProviderError::RequestFailed {
            status,
            url: url.to_string(),
        }),
    }
}
