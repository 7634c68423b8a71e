//! Service lifecycle, prefetch entry points, and cache management.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ConfigFile;
use crate::coord::Coordinate;
use crate::error::PrefetchError;
use crate::features::{FeatureFamily, GeocodeFamily, LanduseFamily, RoadFamily, WaterFamily};
use crate::lookup::OfflineLookup;
use crate::pacing::PacedClient;
use crate::prefetch::{PrefetchCoordinator, ProgressSender};
use crate::provider::{AsyncHttpClient, ProviderError, ReqwestClient};
use crate::store::{RouteFeatureStore, StoreError, StoreStats};

/// Record counts from [`OfflineMapService::prefetch_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefetchSummary {
    pub roads: usize,
    pub water: usize,
    pub landuse: usize,
    pub places: usize,
}

impl PrefetchSummary {
    pub fn total(&self) -> usize {
        self.roads + self.water + self.landuse + self.places
    }
}

/// Per-family store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub roads: StoreStats,
    pub water: StoreStats,
    pub landuse: StoreStats,
    pub places: StoreStats,
}

/// Owner of the family stores and paced upstream clients.
pub struct OfflineMapService<C: AsyncHttpClient> {
    config: ConfigFile,
    overpass: PacedClient<Arc<C>>,
    nominatim: PacedClient<Arc<C>>,
    road_family: RoadFamily,
    water_family: WaterFamily,
    landuse_family: LanduseFamily,
    geocode_family: GeocodeFamily,
    roads: RouteFeatureStore<RoadFamily>,
    water: RouteFeatureStore<WaterFamily>,
    landuse: RouteFeatureStore<LanduseFamily>,
    places: RouteFeatureStore<GeocodeFamily>,
    initialized: AtomicBool,
}

impl OfflineMapService<ReqwestClient> {
    /// Build a service backed by a real HTTP client.
    ///
    /// The shared client only enforces the longer of the two host timeouts;
    /// each [`PacedClient`] applies its own host's limit per request.
    pub fn from_config(config: ConfigFile) -> Result<Self, ProviderError> {
        let timeout_secs = config
            .overpass
            .timeout_secs
            .max(config.nominatim.timeout_secs);
        let client = ReqwestClient::with_timeout(&config.nominatim.user_agent, timeout_secs)?;
        Ok(Self::new(config, client))
    }
}

impl<C: AsyncHttpClient> OfflineMapService<C> {
    /// Create an uninitialized service. Nothing touches disk until
    /// [`initialize`](Self::initialize).
    pub fn new(config: ConfigFile, client: C) -> Self {
        let client = Arc::new(client);
        let cache_root = config.cache.directory.clone();
        let family_dir = |name: &str| -> PathBuf { cache_root.join(name) };

        Self {
            overpass: PacedClient::new(
                "overpass",
                Arc::clone(&client),
                config.overpass_min_interval(),
            )
            .with_timeout(config.overpass_timeout()),
            nominatim: PacedClient::new("nominatim", client, config.nominatim_min_interval())
                .with_timeout(config.nominatim_timeout()),
            road_family: RoadFamily::new(&config.overpass.url),
            water_family: WaterFamily::new(&config.overpass.url),
            landuse_family: LanduseFamily::new(&config.overpass.url),
            geocode_family: GeocodeFamily::new(&config.nominatim.url, &config.nominatim.user_agent),
            roads: RouteFeatureStore::new(family_dir(RoadFamily::NAME)),
            water: RouteFeatureStore::new(family_dir(WaterFamily::NAME)),
            landuse: RouteFeatureStore::new(family_dir(LanduseFamily::NAME)),
            places: RouteFeatureStore::new(family_dir(GeocodeFamily::NAME)),
            initialized: AtomicBool::new(false),
            config,
        }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Create the cache directories and load every persisted route.
    ///
    /// Calling it again reloads from disk.
    pub fn initialize(&self) -> Result<(), PrefetchError> {
        for dir in [
            self.roads.directory(),
            self.water.directory(),
            self.landuse.directory(),
            self.places.directory(),
        ] {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let roads = self.roads.load_all()?;
        let water = self.water.load_all()?;
        let landuse = self.landuse.load_all()?;
        let places = self.places.load_all()?;

        self.initialized.store(true, Ordering::SeqCst);
        tracing::info!(
            cache_dir = %self.config.cache.directory.display(),
            roads,
            water,
            landuse,
            places,
            "Offline map service initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn ensure_initialized(&self) -> Result<(), PrefetchError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(PrefetchError::NotInitialized)
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn prefetch_family<F: FeatureFamily>(
        &self,
        family: &F,
        client: &PacedClient<Arc<C>>,
        store: &RouteFeatureStore<F>,
        interval_m: f64,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        self.ensure_initialized()?;
        PrefetchCoordinator::new(family, client, store)
            .with_interval(interval_m)
            .run(
                route_id,
                geometry,
                self.config.prefetch.corridor_radius_m,
                progress,
                cancellation,
            )
            .await
    }

    pub async fn prefetch_roads(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        self.prefetch_family(
            &self.road_family,
            &self.overpass,
            &self.roads,
            self.config.prefetch.road_interval_m,
            route_id,
            geometry,
            progress,
            cancellation,
        )
        .await
    }

    pub async fn prefetch_water(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        self.prefetch_family(
            &self.water_family,
            &self.overpass,
            &self.water,
            self.config.prefetch.water_interval_m,
            route_id,
            geometry,
            progress,
            cancellation,
        )
        .await
    }

    pub async fn prefetch_landuse(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        self.prefetch_family(
            &self.landuse_family,
            &self.overpass,
            &self.landuse,
            self.config.prefetch.landuse_interval_m,
            route_id,
            geometry,
            progress,
            cancellation,
        )
        .await
    }

    pub async fn prefetch_places(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<usize, PrefetchError> {
        self.prefetch_family(
            &self.geocode_family,
            &self.nominatim,
            &self.places,
            self.config.prefetch.place_interval_m,
            route_id,
            geometry,
            progress,
            cancellation,
        )
        .await
    }

    /// Prefetch roads, water, landuse, then places. Stops at the first error.
    pub async fn prefetch_all(
        &self,
        route_id: &str,
        geometry: &[Coordinate],
        progress: Option<&ProgressSender>,
        cancellation: &CancellationToken,
    ) -> Result<PrefetchSummary, PrefetchError> {
        let summary = PrefetchSummary {
            roads: self
                .prefetch_roads(route_id, geometry, progress, cancellation)
                .await?,
            water: self
                .prefetch_water(route_id, geometry, progress, cancellation)
                .await?,
            landuse: self
                .prefetch_landuse(route_id, geometry, progress, cancellation)
                .await?,
            places: self
                .prefetch_places(route_id, geometry, progress, cancellation)
                .await?,
        };

        tracing::info!(route_id, total = summary.total(), "Route prefetch finished");
        Ok(summary)
    }

    /// Read-only lookups over the cached data.
    pub fn lookup(&self) -> OfflineLookup<'_> {
        OfflineLookup::new(&self.roads, &self.water, &self.landuse, &self.places)
    }

    /// Remove one route from every family. Returns whether any family had it.
    pub fn clear_route(&self, route_id: &str) -> Result<bool, PrefetchError> {
        let roads = self.roads.clear(route_id)?;
        let water = self.water.clear(route_id)?;
        let landuse = self.landuse.clear(route_id)?;
        let places = self.places.clear(route_id)?;
        Ok(roads || water || landuse || places)
    }

    /// Remove every cached route. Returns the number of files deleted.
    pub fn clear_all(&self) -> Result<usize, PrefetchError> {
        Ok(self.roads.clear_all()?
            + self.water.clear_all()?
            + self.landuse.clear_all()?
            + self.places.clear_all()?)
    }

    /// Whether any family holds data for `route_id`.
    pub fn has_route(&self, route_id: &str) -> bool {
        self.roads.has(route_id)
            || self.water.has(route_id)
            || self.landuse.has(route_id)
            || self.places.has(route_id)
    }

    /// Route ids known to any family, in first-seen order.
    pub fn route_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for id in self
            .roads
            .route_ids()
            .into_iter()
            .chain(self.water.route_ids())
            .chain(self.landuse.route_ids())
            .chain(self.places.route_ids())
        {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            roads: self.roads.stats(),
            water: self.water.stats(),
            landuse: self.landuse.stats(),
            places: self.places.stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{json_ok, MockAsyncHttpClient};
    use std::time::Duration;
    use tempfile::TempDir;

    /// One body every family can parse: Overpass elements plus Nominatim
    /// address fields.
    const MIXED_BODY: &str = r#"{
        "elements": [
            {"type": "way", "id": 1, "tags": {"highway": "primary", "name": "High Street"},
             "geometry": [{"lat": 51.5, "lon": -0.1}, {"lat": 51.501, "lon": -0.1}]},
            {"type": "way", "id": 2, "tags": {"waterway": "river"},
             "geometry": [{"lat": 51.5, "lon": -0.1}, {"lat": 51.501, "lon": -0.1}]},
            {"type": "way", "id": 3, "tags": {"leisure": "park"},
             "geometry": [{"lat": 51.5, "lon": -0.1}, {"lat": 51.501, "lon": -0.1}, {"lat": 51.501, "lon": -0.101}]}
        ],
        "place_id": 77,
        "display_name": "High Street, Testville, Testshire",
        "address": {"road": "High Street", "town": "Testville", "county": "Testshire"}
    }"#;

    fn config(temp: &TempDir) -> ConfigFile {
        let mut config = ConfigFile::default();
        config.cache.directory = temp.path().join("cache");
        config.overpass.min_interval_ms = 10;
        config.nominatim.min_interval_ms = 10;
        config
    }

    fn route() -> Vec<Coordinate> {
        vec![Coordinate::new(51.50, -0.1), Coordinate::new(51.52, -0.1)]
    }

    #[tokio::test]
    async fn test_prefetch_requires_initialize() {
        let temp = TempDir::new().unwrap();
        let service = OfflineMapService::new(
            config(&temp),
            MockAsyncHttpClient::always(json_ok(MIXED_BODY)),
        );

        let result = service
            .prefetch_roads("r", &route(), None, &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(PrefetchError::NotInitialized)));
        assert!(!service.is_initialized());
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefetch_all_and_lookup() {
        let temp = TempDir::new().unwrap();
        let service = OfflineMapService::new(
            config(&temp),
            MockAsyncHttpClient::always(json_ok(MIXED_BODY)),
        );
        service.initialize().unwrap();

        let summary = service
            .prefetch_all("commute", &route(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.roads, 1);
        assert_eq!(summary.water, 1);
        assert_eq!(summary.landuse, 1);
        // Two sample points, one place each
        assert_eq!(summary.places, 2);
        assert!(service.has_route("commute"));

        let nearest = service
            .lookup()
            .nearest_place(Coordinate::new(51.50, -0.1), 100.0)
            .unwrap();
        assert_eq!(nearest.place.display_name, "High Street, Testville");
        assert_eq!(nearest.place.region.as_deref(), Some("Testshire"));

        let stats = service.stats();
        assert_eq!(stats.places.records, 2);
        assert_eq!(stats.roads.routes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_reloads_persisted_routes() {
        let temp = TempDir::new().unwrap();
        {
            let service = OfflineMapService::new(
                config(&temp),
                MockAsyncHttpClient::always(json_ok(MIXED_BODY)),
            );
            service.initialize().unwrap();
            service
                .prefetch_roads("r", &route(), None, &CancellationToken::new())
                .await
                .unwrap();
        }

        let restarted = OfflineMapService::new(
            config(&temp),
            MockAsyncHttpClient::always(json_ok("{}")),
        );
        restarted.initialize().unwrap();
        assert_eq!(restarted.lookup().all_roads().len(), 1);
        assert_eq!(restarted.route_ids(), vec!["r"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_route_and_clear_all() {
        let temp = TempDir::new().unwrap();
        let service = OfflineMapService::new(
            config(&temp),
            MockAsyncHttpClient::always(json_ok(MIXED_BODY)),
        );
        service.initialize().unwrap();
        let token = CancellationToken::new();
        service.prefetch_roads("a", &route(), None, &token).await.unwrap();
        service.prefetch_water("a", &route(), None, &token).await.unwrap();
        service.prefetch_roads("b", &route(), None, &token).await.unwrap();

        assert!(service.clear_route("a").unwrap());
        assert!(!service.has_route("a"));
        assert!(service.has_route("b"));
        assert!(!service.clear_route("a").unwrap());

        assert_eq!(service.clear_all().unwrap(), 1);
        assert_eq!(service.stats(), ServiceStats::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_timeouts_are_applied_separately() {
        let temp = TempDir::new().unwrap();
        let mut config = config(&temp);
        config.overpass.timeout_secs = 5;
        config.nominatim.timeout_secs = 60;
        let mock =
            MockAsyncHttpClient::always(json_ok(MIXED_BODY)).with_delay(Duration::from_secs(20));
        let service = OfflineMapService::new(config, mock);
        service.initialize().unwrap();
        let token = CancellationToken::new();

        assert_eq!(service.overpass.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(service.nominatim.timeout(), Some(Duration::from_secs(60)));

        // Every Overpass point times out and is skipped; Nominatim answers
        assert_eq!(service.prefetch_roads("r", &route(), None, &token).await.unwrap(), 0);
        assert_eq!(service.prefetch_places("r", &route(), None, &token).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_initialize_fails_on_unwritable_cache() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let mut config = config(&temp);
        config.cache.directory = blocker;
        let service = OfflineMapService::new(config, MockAsyncHttpClient::always(json_ok("{}")));

        assert!(matches!(
            service.initialize(),
            Err(PrefetchError::CacheWriteFailed(_))
        ));
        assert!(!service.is_initialized());
    }
}
