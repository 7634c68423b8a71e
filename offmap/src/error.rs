//! Errors surfaced by prefetch and service calls.

use thiserror::Error;

use crate::corridor::CorridorError;
use crate::provider::ProviderError;
use crate::store::StoreError;

/// Errors returned from a prefetch or a cache-management call.
///
/// `RateLimited`, `RequestFailed`, `Unavailable` and `InvalidResponse`
/// classify single sample-point failures; the prefetch loop logs them and
/// moves on rather than returning them.
#[derive(Debug, Error)]
pub enum PrefetchError {
    #[error("Offline map service is not initialized")]
    NotInitialized,

    #[error("Upstream rate limit hit")]
    RateLimited,

    #[error("Upstream request failed with HTTP {status}")]
    RequestFailed { status: u16 },

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    #[error("Invalid route geometry: {0}")]
    InvalidGeometry(#[from] CorridorError),

    #[error("Cache write failed: {0}")]
    CacheWriteFailed(#[from] StoreError),

    #[error("Prefetch cancelled after caching {features_cached} records")]
    Cancelled { features_cached: usize },
}

impl From<ProviderError> for PrefetchError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { .. } => PrefetchError::RateLimited,
            ProviderError::RequestFailed { status, .. } => PrefetchError::RequestFailed { status },
            ProviderError::Unavailable(msg) | ProviderError::ClientBuild(msg) => {
                PrefetchError::Unavailable(msg)
            }
            ProviderError::InvalidResponse(msg) => PrefetchError::InvalidResponse(msg),
            ProviderError::Cancelled => PrefetchError::Cancelled { features_cached: 0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_classification() {
        let err: PrefetchError = ProviderError::RateLimited {
            url: "http://x".to_string(),
        }
        .into();
        assert!(matches!(err, PrefetchError::RateLimited));

        let err: PrefetchError = ProviderError::RequestFailed {
            status: 500,
            url: "http://x".to_string(),
        }
        .into();
        assert!(matches!(err, PrefetchError::RequestFailed { status: 500 }));

        let err: PrefetchError = ProviderError::Unavailable("timeout".to_string()).into();
        assert_eq!(err.to_string(), "Upstream unavailable: timeout");
    }

    #[test]
    fn test_cancelled_message() {
        let err = PrefetchError::Cancelled { features_cached: 4 };
        assert_eq!(err.to_string(), "Prefetch cancelled after caching 4 records");
    }
}
