//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;

use super::ConfigError;
use crate::corridor::{DEFAULT_AREA_INTERVAL_M, DEFAULT_LINE_INTERVAL_M};
use crate::lookup::DEFAULT_PLACE_THRESHOLD_M;
use crate::pacing::DEFAULT_MIN_INTERVAL;
use crate::provider::nominatim::DEFAULT_NOMINATIM_URL;
use crate::provider::overpass::DEFAULT_OVERPASS_URL;
use crate::provider::DEFAULT_TIMEOUT_SECS;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "OFFMAP_CONFIG";

/// Default query radius around each sample point.
pub const DEFAULT_CORRIDOR_RADIUS_M: f64 = 500.0;

/// Default identifier sent to the geocoding host.
pub const DEFAULT_USER_AGENT: &str = concat!(
    "offmap/",
    env!("CARGO_PKG_VERSION"),
    " (offline navigation prefetch)"
);

/// Location of the config file: `$OFFMAP_CONFIG`, else
/// `<config dir>/offmap/config.ini`.
pub fn config_file_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("offmap")
        .join("config.ini")
}

/// Default cache root: `<cache dir>/offmap`.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("offmap")
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Root directory; each family gets a subdirectory.
    pub directory: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverpassSettings {
    pub url: String,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NominatimSettings {
    pub url: String,
    pub user_agent: String,
    pub min_interval_ms: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrefetchSettings {
    pub corridor_radius_m: f64,
    pub road_interval_m: f64,
    pub water_interval_m: f64,
    pub landuse_interval_m: f64,
    pub place_interval_m: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupSettings {
    pub place_threshold_m: f64,
}

/// Complete configuration, one struct per INI section.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub cache: CacheSettings,
    pub overpass: OverpassSettings,
    pub nominatim: NominatimSettings,
    pub prefetch: PrefetchSettings,
    pub lookup: LookupSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let pacing_ms = DEFAULT_MIN_INTERVAL.as_millis() as u64;
        Self {
            cache: CacheSettings {
                directory: default_cache_dir(),
            },
            overpass: OverpassSettings {
                url: DEFAULT_OVERPASS_URL.to_string(),
                min_interval_ms: pacing_ms,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            nominatim: NominatimSettings {
                url: DEFAULT_NOMINATIM_URL.to_string(),
                user_agent: DEFAULT_USER_AGENT.to_string(),
                min_interval_ms: pacing_ms,
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            prefetch: PrefetchSettings {
                corridor_radius_m: DEFAULT_CORRIDOR_RADIUS_M,
                road_interval_m: DEFAULT_LINE_INTERVAL_M,
                water_interval_m: DEFAULT_AREA_INTERVAL_M,
                landuse_interval_m: DEFAULT_AREA_INTERVAL_M,
                place_interval_m: DEFAULT_LINE_INTERVAL_M,
            },
            lookup: LookupSettings {
                place_threshold_m: DEFAULT_PLACE_THRESHOLD_M,
            },
        }
    }
}

impl ConfigFile {
    /// Load from [`config_file_path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`. A missing file yields defaults; keys absent from
    /// the file keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let mut config = Self::default();
        for key in super::ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value.trim())?;
            }
        }

        Ok(config)
    }

    /// Save to [`config_file_path`].
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Write every setting to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut ini = Ini::new();
        for key in super::ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        ini.write_to_file(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn overpass_min_interval(&self) -> Duration {
        Duration::from_millis(self.overpass.min_interval_ms)
    }

    pub fn nominatim_min_interval(&self) -> Duration {
        Duration::from_millis(self.nominatim.min_interval_ms)
    }

    pub fn overpass_timeout(&self) -> Duration {
        Duration::from_secs(self.overpass.timeout_secs)
    }

    pub fn nominatim_timeout(&self) -> Duration {
        Duration::from_secs(self.nominatim.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.prefetch.water_interval_m, 4_000.0);
        assert_eq!(config.overpass_min_interval(), Duration::from_millis(1100));
    }

    #[test]
    fn test_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.cache.directory = PathBuf::from("/var/cache/offmap");
        config.overpass.url = "http://localhost:12345/api/interpreter".to_string();
        config.nominatim.min_interval_ms = 2000;
        config.prefetch.corridor_radius_m = 750.5;
        config.lookup.place_threshold_m = 250.0;
        config.save_to(&path).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[prefetch]\nroad_interval_m = 1200\n").unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.prefetch.road_interval_m, 1200.0);
        assert_eq!(config.prefetch.landuse_interval_m, DEFAULT_AREA_INTERVAL_M);
        assert_eq!(config.overpass.url, DEFAULT_OVERPASS_URL);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[overpass]\nmin_interval_ms = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "overpass.min_interval_ms"));
    }
}
