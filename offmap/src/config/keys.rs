//! `section.key` names for every setting.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};

/// A single configurable setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    CacheDirectory,
    OverpassUrl,
    OverpassMinIntervalMs,
    OverpassTimeoutSecs,
    NominatimUrl,
    NominatimUserAgent,
    NominatimMinIntervalMs,
    NominatimTimeoutSecs,
    PrefetchCorridorRadiusM,
    PrefetchRoadIntervalM,
    PrefetchWaterIntervalM,
    PrefetchLanduseIntervalM,
    PrefetchPlaceIntervalM,
    LookupPlaceThresholdM,
}

const ALL_KEYS: [ConfigKey; 14] = [
    ConfigKey::CacheDirectory,
    ConfigKey::OverpassUrl,
    ConfigKey::OverpassMinIntervalMs,
    ConfigKey::OverpassTimeoutSecs,
    ConfigKey::NominatimUrl,
    ConfigKey::NominatimUserAgent,
    ConfigKey::NominatimMinIntervalMs,
    ConfigKey::NominatimTimeoutSecs,
    ConfigKey::PrefetchCorridorRadiusM,
    ConfigKey::PrefetchRoadIntervalM,
    ConfigKey::PrefetchWaterIntervalM,
    ConfigKey::PrefetchLanduseIntervalM,
    ConfigKey::PrefetchPlaceIntervalM,
    ConfigKey::LookupPlaceThresholdM,
];

impl ConfigKey {
    /// Every key, grouped by section.
    pub fn all() -> &'static [ConfigKey] {
        &ALL_KEYS
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory => "cache",
            ConfigKey::OverpassUrl
            | ConfigKey::OverpassMinIntervalMs
            | ConfigKey::OverpassTimeoutSecs => "overpass",
            ConfigKey::NominatimUrl
            | ConfigKey::NominatimUserAgent
            | ConfigKey::NominatimMinIntervalMs
            | ConfigKey::NominatimTimeoutSecs => "nominatim",
            ConfigKey::PrefetchCorridorRadiusM
            | ConfigKey::PrefetchRoadIntervalM
            | ConfigKey::PrefetchWaterIntervalM
            | ConfigKey::PrefetchLanduseIntervalM
            | ConfigKey::PrefetchPlaceIntervalM => "prefetch",
            ConfigKey::LookupPlaceThresholdM => "lookup",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::CacheDirectory => "directory",
            ConfigKey::OverpassUrl | ConfigKey::NominatimUrl => "url",
            ConfigKey::NominatimUserAgent => "user_agent",
            ConfigKey::OverpassMinIntervalMs | ConfigKey::NominatimMinIntervalMs => {
                "min_interval_ms"
            }
            ConfigKey::OverpassTimeoutSecs | ConfigKey::NominatimTimeoutSecs => "timeout_secs",
            ConfigKey::PrefetchCorridorRadiusM => "corridor_radius_m",
            ConfigKey::PrefetchRoadIntervalM => "road_interval_m",
            ConfigKey::PrefetchWaterIntervalM => "water_interval_m",
            ConfigKey::PrefetchLanduseIntervalM => "landuse_interval_m",
            ConfigKey::PrefetchPlaceIntervalM => "place_interval_m",
            ConfigKey::LookupPlaceThresholdM => "place_threshold_m",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as text.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::CacheDirectory => config.cache.directory.display().to_string(),
            ConfigKey::OverpassUrl => config.overpass.url.clone(),
            ConfigKey::OverpassMinIntervalMs => config.overpass.min_interval_ms.to_string(),
            ConfigKey::OverpassTimeoutSecs => config.overpass.timeout_secs.to_string(),
            ConfigKey::NominatimUrl => config.nominatim.url.clone(),
            ConfigKey::NominatimUserAgent => config.nominatim.user_agent.clone(),
            ConfigKey::NominatimMinIntervalMs => config.nominatim.min_interval_ms.to_string(),
            ConfigKey::NominatimTimeoutSecs => config.nominatim.timeout_secs.to_string(),
            ConfigKey::PrefetchCorridorRadiusM => config.prefetch.corridor_radius_m.to_string(),
            ConfigKey::PrefetchRoadIntervalM => config.prefetch.road_interval_m.to_string(),
            ConfigKey::PrefetchWaterIntervalM => config.prefetch.water_interval_m.to_string(),
            ConfigKey::PrefetchLanduseIntervalM => config.prefetch.landuse_interval_m.to_string(),
            ConfigKey::PrefetchPlaceIntervalM => config.prefetch.place_interval_m.to_string(),
            ConfigKey::LookupPlaceThresholdM => config.lookup.place_threshold_m.to_string(),
        }
    }

    /// Parse `value` and store it in `config`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        match self {
            ConfigKey::CacheDirectory => config.cache.directory = PathBuf::from(self.text(value)?),
            ConfigKey::OverpassUrl => config.overpass.url = self.text(value)?,
            ConfigKey::OverpassMinIntervalMs => config.overpass.min_interval_ms = self.parse(value)?,
            ConfigKey::OverpassTimeoutSecs => config.overpass.timeout_secs = self.positive_int(value)?,
            ConfigKey::NominatimUrl => config.nominatim.url = self.text(value)?,
            ConfigKey::NominatimUserAgent => config.nominatim.user_agent = self.text(value)?,
            ConfigKey::NominatimMinIntervalMs => {
                config.nominatim.min_interval_ms = self.parse(value)?
            }
            ConfigKey::NominatimTimeoutSecs => {
                config.nominatim.timeout_secs = self.positive_int(value)?
            }
            ConfigKey::PrefetchCorridorRadiusM => {
                config.prefetch.corridor_radius_m = self.meters(value)?
            }
            ConfigKey::PrefetchRoadIntervalM => config.prefetch.road_interval_m = self.meters(value)?,
            ConfigKey::PrefetchWaterIntervalM => {
                config.prefetch.water_interval_m = self.meters(value)?
            }
            ConfigKey::PrefetchLanduseIntervalM => {
                config.prefetch.landuse_interval_m = self.meters(value)?
            }
            ConfigKey::PrefetchPlaceIntervalM => {
                config.prefetch.place_interval_m = self.meters(value)?
            }
            ConfigKey::LookupPlaceThresholdM => {
                config.lookup.place_threshold_m = self.meters(value)?
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
        }
    }

    fn text(&self, value: &str) -> Result<String, ConfigError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(self.invalid(value));
        }
        Ok(trimmed.to_string())
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError> {
        value.trim().parse().map_err(|_| self.invalid(value))
    }

    fn positive_int(&self, value: &str) -> Result<u64, ConfigError> {
        match self.parse::<u64>(value)? {
            0 => Err(self.invalid(value)),
            n => Ok(n),
        }
    }

    /// Finite, strictly positive distance.
    fn meters(&self, value: &str) -> Result<f64, ConfigError> {
        let meters: f64 = self.parse(value)?;
        if meters.is_finite() && meters > 0.0 {
            Ok(meters)
        } else {
            Err(self.invalid(value))
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ALL_KEYS
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for key in ConfigKey::all() {
            assert!(seen.insert(key.name()), "duplicate {}", key);
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
        }
    }

    #[test]
    fn test_unknown_key() {
        let err = "cache.size".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "cache.size"));
    }

    #[test]
    fn test_set_validates() {
        let mut config = ConfigFile::default();

        ConfigKey::PrefetchRoadIntervalM
            .set(&mut config, "2500")
            .unwrap();
        assert_eq!(config.prefetch.road_interval_m, 2500.0);

        assert!(ConfigKey::PrefetchRoadIntervalM.set(&mut config, "-1").is_err());
        assert!(ConfigKey::PrefetchRoadIntervalM.set(&mut config, "NaN").is_err());
        assert!(ConfigKey::OverpassTimeoutSecs.set(&mut config, "0").is_err());
        assert!(ConfigKey::NominatimUserAgent.set(&mut config, "  ").is_err());

        // A zero pacing gap is allowed for local mirrors
        ConfigKey::OverpassMinIntervalMs.set(&mut config, "0").unwrap();
        assert_eq!(config.overpass.min_interval_ms, 0);
    }

    #[test]
    fn test_get_reflects_config() {
        let config = ConfigFile::default();
        assert_eq!(ConfigKey::PrefetchWaterIntervalM.get(&config), "4000");
        assert_eq!(ConfigKey::OverpassMinIntervalMs.get(&config), "1100");
    }
}
