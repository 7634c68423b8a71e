//! Per-host request pacing.
//!
//! Public geodata hosts ask clients to keep at most one request per second.
//! A [`PacedClient`] wraps an HTTP client for exactly one upstream host and
//! enforces a minimum gap between successive dispatches to that host.
//!
//! # Design
//!
//! - The last-dispatch instant lives in an owned [`Pacer`], not a global, so
//!   each host paces independently and tests can build as many as they need
//! - The instant is guarded by an async mutex held across the wait, so
//!   concurrent callers on the same host serialize instead of racing
//! - The gap is measured from when the previous caller *finished waiting*,
//!   not from when its response arrived
//! - Waiting and the in-flight request both honor a cancellation token
//! - An optional per-host timeout bounds each in-flight request
//!
//! # Example
//!
//! ```ignore
//! let overpass = PacedClient::new("overpass", client, DEFAULT_MIN_INTERVAL);
//! let body = overpass.dispatch(request, &cancellation).await?;
//! ```

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::provider::{classify, AsyncHttpClient, HttpRequest, HttpResponse, ProviderError};

/// Default minimum gap between requests to one host.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Minimum-gap gate for one upstream host.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until `min_interval` has passed since the previous caller's wait
    /// completed, then record this caller's dispatch time.
    ///
    /// Returns [`ProviderError::Cancelled`] without recording anything if the
    /// token fires first.
    pub async fn wait(&self, cancellation: &CancellationToken) -> Result<(), ProviderError> {
        let mut last = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ProviderError::Cancelled),
            guard = self.last_dispatch.lock() => guard,
        };

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => return Err(ProviderError::Cancelled),
                    _ = tokio::time::sleep_until(ready_at) => {}
                }
            }
        }

        *last = Some(Instant::now());
        Ok(())
    }
}

/// HTTP client bound to one upstream host with enforced pacing.
pub struct PacedClient<C: AsyncHttpClient> {
    host: String,
    client: C,
    pacer: Pacer,
    timeout: Option<Duration>,
}

impl<C: AsyncHttpClient> PacedClient<C> {
    /// Creates a paced client.
    ///
    /// # Arguments
    ///
    /// * `host` - Label used in logs (e.g. "overpass")
    /// * `client` - HTTP client for the host
    /// * `min_interval` - Minimum gap between dispatches
    pub fn new(host: impl Into<String>, client: C, min_interval: Duration) -> Self {
        Self {
            host: host.into(),
            client,
            pacer: Pacer::new(min_interval),
            timeout: None,
        }
    }

    /// Fail requests to this host that take longer than `timeout` with
    /// [`ProviderError::Unavailable`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn min_interval(&self) -> Duration {
        self.pacer.min_interval()
    }

    /// The wrapped HTTP client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Wait for the host's pacing slot, issue `request`, and classify the
    /// response.
    ///
    /// Cancellation during the wait or while the request is in flight drops
    /// the request future and returns [`ProviderError::Cancelled`].
    pub async fn dispatch(
        &self,
        request: &HttpRequest,
        cancellation: &CancellationToken,
    ) -> Result<Vec<u8>, ProviderError> {
        self.pacer.wait(cancellation).await?;

        tracing::debug!(host = %self.host, url = %request.url, "Dispatching request");

        let response = tokio::select! {
            biased;
            _ = cancellation.cancelled() => return Err(ProviderError::Cancelled),
            result = self.execute(request) => result?,
        };

        classify(response, &request.url)
    }

    async fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ProviderError> {
        let Some(timeout) = self.timeout else {
            return self.client.execute(request).await;
        };

        match tokio::time::timeout(timeout, self.client.execute(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Unavailable(format!(
                "{} did not answer within {}s",
                self.host,
                timeout.as_secs_f64()
            ))),
        }
    }
}
