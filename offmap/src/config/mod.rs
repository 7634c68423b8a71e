//! Configuration file handling.
//!
//! Settings live in an INI file at `<config dir>/offmap/config.ini`
//! (override with `OFFMAP_CONFIG`). Every setting has a default, so a
//! missing file or a missing key is never an error.
//!
//! ```ini
//! [cache]
//! directory = /home/pi/.cache/offmap
//!
//! [overpass]
//! url = https://overpass-api.de/api/interpreter
//! min_interval_ms = 1100
//! timeout_secs = 30
//!
//! [nominatim]
//! url = https://nominatim.openstreetmap.org
//! user_agent = offmap/0.3.0 (offline navigation prefetch)
//! min_interval_ms = 1100
//! timeout_secs = 30
//!
//! [prefetch]
//! corridor_radius_m = 500
//! road_interval_m = 1500
//! water_interval_m = 4000
//! landuse_interval_m = 4000
//! place_interval_m = 1500
//!
//! [lookup]
//! place_threshold_m = 100
//! ```

mod file;
mod keys;

pub use file::{
    config_file_path, default_cache_dir, CacheSettings, ConfigFile, LookupSettings,
    NominatimSettings, OverpassSettings, PrefetchSettings, CONFIG_ENV_VAR,
    DEFAULT_CORRIDOR_RADIUS_M, DEFAULT_USER_AGENT,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading, writing, or editing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),
}
