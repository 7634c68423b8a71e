//! Sequential per-family prefetch loop.

use tokio_util::sync::CancellationToken;

use super::progress::{PrefetchProgress, ProgressSender};
use crate::coord::Coordinate;
use crate::corridor;
use crate::error::PrefetchError;
use crate::features::FeatureFamily;
use crate::pacing::PacedClient;
use crate::provider::{AsyncHttpClient, ProviderError};
use crate::store::RouteFeatureStore;

/// Drives one family's prefetch for one route.
///
/// Borrows its collaborators; the service builds one per call.
pub struct PrefetchCoordinator<'a, F: FeatureFamily, C: AsyncHttpClient> {
    family: &'a F,
    client: &'a PacedClient<C>,
    store: &'a RouteFeatureStore<F>,
    interval_m: f64,
}

impl<'a, F: FeatureFamily, C: AsyncHttpClient> PrefetchCoordinator<'a, F, C> {
    /// Create a coordinator sampling at the family's default interval.
    pub fn new(family: &'a F, client: &'a PacedClient<C>, store: &'a RouteFeatureStore<F>) -> Self {
        Self {
            family,
            client,
            store,
            interval_m: F::DEFAULT_INTERVAL_M,
        }
    }

    /// Override the sample interval in meters.
    pub fn with_interval(mut self, interval_m: f64) -> Self {
        self.interval_m = interval_m;
        self
    }

    pub fn interval_m(&self) -> f64 {
        self.interval_m
    }

    /// Prefetch `geometry` into the store under `route_id`.
    ///
    /// Returns the number of distinct records cached for the route. An empty
    /// geometry returns `Ok(0)` without creating an entry or touching the
    /// network. On cancellation the partial entry is persisted and
    /// [`PrefetchError::Cancelled`] carries its record count; no `complete`
    /// event is sent in that case.
    pub async fn run(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        corridor_radius_m: f64,
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        let samples = corridor::sample(geometry, self.interval_m)?;
        let total = samples.len();

        tracing::info!(
            family = F::NAME,
            route_id,
            points = geometry.len(),
            samples = total,
            interval_m = self.interval_m,
            radius_m = corridor_radius_m,
            "Starting prefetch"
        );
        self.report(progress, 0, total, 0, false);

        if samples.is_empty() {
            self.report(progress, 0, 0, 0, true);
            return Ok(0);
        }

        self.store.begin(route_id, Some(corridor_radius_m));

        for (index, point) in samples.iter().enumerate() {
            if cancellation.is_cancelled() {
                return Err(self.cancelled(route_id, index, total));
            }

            let request = self.family.build_request(*point, corridor_radius_m);
            match self.client.dispatch(&request, cancellation).await {
                Ok(body) => self.absorb(route_id, *point, &body),
                Err(ProviderError::Cancelled) => {
                    return Err(self.cancelled(route_id, index, total));
                }
                Err(e) => {
                    let outcome = PrefetchError::from(e);
                    tracing::warn!(
                        family = F::NAME,
                        route_id,
                        point = %point,
                        error = %outcome,
                        "Sample point failed, continuing"
                    );
                }
            }

            self.report(progress, index + 1, total, self.store.len(route_id), false);
        }

        self.store.persist(route_id)?;

        let found = self.store.len(route_id);
        self.report(progress, total, total, found, true);
        tracing::info!(family = F::NAME, route_id, records = found, "Prefetch complete");

        Ok(found)
    }

    /// Parse one successful response and merge it into the route entry.
    fn absorb(&self, route_id: &str, point: Coordinate, body: &[u8]) {
        let records = match self.family.parse(point, body) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    family = F::NAME,
                    route_id,
                    point = %point,
                    error = %PrefetchError::from(e),
                    "Discarding unparseable response"
                );
                return;
            }
        };

        let parsed = records.len();
        let added = self.store.upsert(route_id, records);
        tracing::debug!(family = F::NAME, route_id, point = %point, parsed, added, "Sample point cached");

        // Partial results stay visible on disk if the run dies mid-way
        if let Err(e) = self.store.persist(route_id) {
            tracing::warn!(family = F::NAME, route_id, error = %e, "Snapshot persist failed");
        }
    }

    /// Persist what was collected and build the cancellation error.
    fn cancelled(&self, route_id: &str, processed: usize, total: usize) -> PrefetchError {
        if let Err(e) = self.store.persist(route_id) {
            tracing::warn!(family = F::NAME, route_id, error = %e, "Persist after cancellation failed");
        }

        let features_cached = self.store.len(route_id);
        tracing::info!(
            family = F::NAME,
            route_id,
            processed,
            total,
            records = features_cached,
            "Prefetch cancelled"
        );
        PrefetchError::Cancelled { features_cached }
    }

    fn report(
        &self,
        progress: Option<&ProgressSender>,
        current: usize,
        total: usize,
        found: usize,
        complete: bool,
    ) {
        if let Some(tx) = progress {
            // A dropped receiver just means nobody is listening
            let _ = tx.send(PrefetchProgress {
                family: F::NAME,
                current,
                total,
                found,
                complete,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::RoadFamily;
    use crate::prefetch::progress_channel;
    use crate::provider::{json_ok, HttpResponse, MockAsyncHttpClient};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::Instant;

    const INTERVAL: Duration = Duration::from_millis(1100);

    /// Three points roughly 2.2 km apart; sampling at 1 km keeps all of them.
    fn three_point_route() -> Vec<Coordinate> {
        vec![
            Coordinate::new(51.50, -0.1),
            Coordinate::new(51.52, -0.1),
            Coordinate::new(51.54, -0.1),
        ]
    }

    fn roads_body(ids: &[i64]) -> Result<HttpResponse, ProviderError> {
        let elements: Vec<String> = ids
            .iter()
            .map(|id| {
                format!(
                    r#"{{"type": "way", "id": {}, "tags": {{"highway": "secondary"}},
                        "geometry": [{{"lat": 51.5, "lon": -0.1}}, {{"lat": 51.51, "lon": -0.1}}]}}"#,
                    id
                )
            })
            .collect();
        json_ok(&format!(r#"{{"elements": [{}]}}"#, elements.join(",")))
    }

    struct Fixture {
        _temp: TempDir,
        family: RoadFamily,
        client: PacedClient<MockAsyncHttpClient>,
        store: RouteFeatureStore<RoadFamily>,
    }

    impl Fixture {
        fn new(mock: MockAsyncHttpClient) -> Self {
            let temp = TempDir::new().unwrap();
            let store = RouteFeatureStore::new(temp.path().join("roads"));
            Self {
                _temp: temp,
                family: RoadFamily::new("http://overpass.test"),
                client: PacedClient::new("overpass", mock, INTERVAL),
                store,
            }
        }

        fn coordinator(&self) -> PrefetchCoordinator<'_, RoadFamily, MockAsyncHttpClient> {
            PrefetchCoordinator::new(&self.family, &self.client, &self.store).with_interval(1_000.0)
        }
    }

    fn drain(rx: &mut crate::prefetch::ProgressReceiver) -> Vec<PrefetchProgress> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_route_makes_no_requests() {
        let fixture = Fixture::new(MockAsyncHttpClient::always(roads_body(&[1])));
        let (tx, mut rx) = progress_channel();

        let count = fixture
            .coordinator()
            .run("empty", &[], 300.0, Some(&tx), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert_eq!(fixture.client.client().request_count(), 0);
        assert!(!fixture.store.has("empty"));
        let events = drain(&mut rx);
        assert!(events.last().unwrap().complete);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicates_across_points_stored_once() {
        let mock = MockAsyncHttpClient::scripted(
            vec![roads_body(&[1, 2]), roads_body(&[2, 3])],
            roads_body(&[3]),
        );
        let fixture = Fixture::new(mock);

        let count = fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 3);
        assert_eq!(fixture.client.client().request_count(), 3);
        assert!(fixture.store.route_path("r").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_point_does_not_abort() {
        let mock = MockAsyncHttpClient::scripted(
            vec![
                roads_body(&[1]),
                Ok(HttpResponse::new(500, Vec::new())),
                roads_body(&[3]),
            ],
            roads_body(&[]),
        );
        let fixture = Fixture::new(mock);
        let (tx, mut rx) = progress_channel();

        let count = fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, Some(&tx), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 2);
        let events = drain(&mut rx);
        let summary: Vec<(usize, usize, usize, bool)> = events
            .iter()
            .map(|e| (e.current, e.total, e.found, e.complete))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, 3, 0, false),
                (1, 3, 1, false),
                (2, 3, 1, false),
                (3, 3, 2, false),
                (3, 3, 2, true),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_and_garbage_are_skipped() {
        let mock = MockAsyncHttpClient::scripted(
            vec![
                Ok(HttpResponse::new(429, Vec::new())),
                json_ok("<html>busy</html>"),
                Err(ProviderError::Unavailable("connection reset".to_string())),
            ],
            roads_body(&[]),
        );
        let fixture = Fixture::new(mock);

        let count = fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(count, 0);
        assert!(fixture.store.has("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_points_are_paced() {
        let fixture = Fixture::new(MockAsyncHttpClient::always(roads_body(&[1])));
        let start = Instant::now();

        fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(start.elapsed() >= INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_replaces_entry() {
        let mock = MockAsyncHttpClient::scripted(
            vec![roads_body(&[1]), roads_body(&[2]), roads_body(&[3])],
            roads_body(&[9]),
        );
        let fixture = Fixture::new(mock);
        let route = three_point_route();
        let token = CancellationToken::new();

        assert_eq!(fixture.coordinator().run("r", &route, 300.0, None, &token).await.unwrap(), 3);
        assert_eq!(fixture.coordinator().run("r", &route, 300.0, None, &token).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_persists_partial() {
        let mock = MockAsyncHttpClient::scripted(
            vec![roads_body(&[1]), roads_body(&[2])],
            roads_body(&[3]),
        );
        let fixture = Fixture::new(mock);
        let (tx, mut rx) = progress_channel();
        let token = CancellationToken::new();

        // Third point's pacer wait ends at 2.2 s; cancel before that
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1500)).await;
            canceller.cancel();
        });

        let result = fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, Some(&tx), &token)
            .await;

        assert!(matches!(
            result,
            Err(PrefetchError::Cancelled { features_cached: 2 })
        ));
        assert_eq!(fixture.client.client().request_count(), 2);
        assert!(drain(&mut rx).iter().all(|e| !e.complete));

        let reloaded = RouteFeatureStore::<RoadFamily>::new(fixture.store.directory());
        reloaded.load_all().unwrap();
        assert_eq!(reloaded.len("r"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let fixture = Fixture::new(MockAsyncHttpClient::always(roads_body(&[1])));
        let token = CancellationToken::new();
        token.cancel();

        let result = fixture
            .coordinator()
            .run("r", &three_point_route(), 300.0, None, &token)
            .await;

        assert!(matches!(
            result,
            Err(PrefetchError::Cancelled { features_cached: 0 })
        ));
        assert_eq!(fixture.client.client().request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_geometry_is_error() {
        let fixture = Fixture::new(MockAsyncHttpClient::always(roads_body(&[1])));
        let route = vec![Coordinate::new(95.0, 0.0), Coordinate::new(0.0, 0.0)];

        let result = fixture
            .coordinator()
            .run("r", &route, 300.0, None, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(PrefetchError::InvalidGeometry(_))));
        assert!(!fixture.store.has("r"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_write_failure_is_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let family = RoadFamily::new("http://overpass.test");
        let client = PacedClient::new("overpass", MockAsyncHttpClient::always(roads_body(&[1])), INTERVAL);
        let store = RouteFeatureStore::new(blocker.join("roads"));

        let result = PrefetchCoordinator::new(&family, &client, &store)
            .run("r", &three_point_route(), 300.0, None, &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(PrefetchError::CacheWriteFailed(_))));
    }
}
