//! Upstream geodata host abstraction
//!
//! This module provides the HTTP seam used by every prefetch request and the
//! wire formats of the two upstream hosts: an Overpass-style feature API and
//! a Nominatim-style reverse-geocoding API.
//!
//! # Outcome classification
//!
//! | Upstream result          | Error                          |
//! |--------------------------|--------------------------------|
//! | 2xx                      | (success)                      |
//! | 429                      | [`ProviderError::RateLimited`] |
//! | other status             | [`ProviderError::RequestFailed`] |
//! | timeout / DNS / refused  | [`ProviderError::Unavailable`] |
//!
//! ```ignore
//! use offmap::provider::{AsyncHttpClient, ReqwestClient, classify};
//!
//! let client = ReqwestClient::new("offmap/0.3 (contact@example.org)")?;
//! let response = client.execute(&request).await?;
//! let body = classify(response, &request.url)?;
//! ```

mod http;
pub mod nominatim;
pub mod overpass;
mod types;

pub use http::{AsyncHttpClient, ReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use types::{classify, HttpMethod, HttpRequest, HttpResponse, ProviderError};

#[cfg(test)]
pub use http::tests::{json_ok, MockAsyncHttpClient};
