//! `offmap config` - inspect and edit the INI settings file.
//!
//! Keys are parsed by clap straight into [`ConfigKey`], so a typo is
//! rejected before the file is touched. Values go through the library's own
//! validation and are only written when they parse.

use std::io::Write;
use std::path::Path;

use clap::Subcommand;
use offmap::config::{config_file_path, ConfigFile, ConfigKey, CONFIG_ENV_VAR};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting (e.g. prefetch.road_interval_m)
    Get { key: ConfigKey },

    /// Change one setting (e.g. nominatim.user_agent "my-device/1.0")
    Set { key: ConfigKey, value: String },

    /// Restore one setting to its built-in default
    Reset { key: ConfigKey },

    /// Print every setting; `*` marks values that differ from the defaults
    List {
        /// Only show changed settings
        #[arg(long)]
        changed: bool,
    },

    /// Print where the settings file lives
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    let mut out = std::io::stdout().lock();
    execute(command, &path, &mut out)
}

fn execute(command: ConfigCommands, path: &Path, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let config = ConfigFile::load_from(path)?;
            writeln!(out, "{}", key.get(&config))?;
        }
        ConfigCommands::Set { key, value } => {
            let mut config = ConfigFile::load_from(path)?;
            let previous = key.get(&config);
            key.set(&mut config, &value)?;
            config.save_to(path)?;
            writeln!(out, "{} = {} (was {})", key, key.get(&config), previous)?;
        }
        ConfigCommands::Reset { key } => {
            let default = key.get(&ConfigFile::default());
            let mut config = ConfigFile::load_from(path)?;
            key.set(&mut config, &default)?;
            config.save_to(path)?;
            writeln!(out, "{} = {} (default)", key, default)?;
        }
        ConfigCommands::List { changed } => list(path, changed, out)?,
        ConfigCommands::Path => {
            writeln!(out, "{}", path.display())?;
            if std::env::var_os(CONFIG_ENV_VAR).is_some() {
                writeln!(out, "  (set by {})", CONFIG_ENV_VAR)?;
            }
            if !path.exists() {
                writeln!(out, "  (not created yet, defaults in use)")?;
            }
        }
    }
    Ok(())
}

fn list(path: &Path, only_changed: bool, out: &mut impl Write) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    let defaults = ConfigFile::default();
    let mut section = "";

    for key in ConfigKey::all() {
        let value = key.get(&config);
        let changed = value != key.get(&defaults);
        if only_changed && !changed {
            continue;
        }

        if key.section() != section {
            if !section.is_empty() {
                writeln!(out)?;
            }
            section = key.section();
            writeln!(out, "[{}]", section)?;
        }
        let marker = if changed { '*' } else { ' ' };
        writeln!(out, "{} {} = {}", marker, key.key_name(), value)?;
    }

    if only_changed && section.is_empty() {
        writeln!(out, "All settings are at their defaults")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use offmap::config::ConfigError;
    use tempfile::TempDir;

    fn key(name: &str) -> ConfigKey {
        name.parse().unwrap()
    }

    fn output(command: ConfigCommands, path: &Path) -> Result<String, CliError> {
        let mut out = Vec::new();
        execute(command, path, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_set_then_get_round_trips_through_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("offmap").join("config.ini");

        let printed = output(
            ConfigCommands::Set {
                key: key("prefetch.road_interval_m"),
                value: "900".to_string(),
            },
            &path,
        )
        .unwrap();
        assert_eq!(printed, "prefetch.road_interval_m = 900 (was 1500)\n");
        assert!(path.exists());

        let got = output(
            ConfigCommands::Get {
                key: key("prefetch.road_interval_m"),
            },
            &path,
        )
        .unwrap();
        assert_eq!(got, "900\n");
        assert_eq!(ConfigFile::load_from(&path).unwrap().prefetch.road_interval_m, 900.0);
    }

    #[test]
    fn test_invalid_value_is_rejected_without_writing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        let result = output(
            ConfigCommands::Set {
                key: key("lookup.place_threshold_m"),
                value: "-5".to_string(),
            },
            &path,
        );

        assert!(matches!(
            result,
            Err(CliError::ConfigFile(ConfigError::InvalidValue { .. }))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_reset_restores_default() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        let timeout = key("overpass.timeout_secs");

        output(
            ConfigCommands::Set {
                key: timeout,
                value: "90".to_string(),
            },
            &path,
        )
        .unwrap();
        output(ConfigCommands::Reset { key: timeout }, &path).unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(
            config.overpass.timeout_secs,
            ConfigFile::default().overpass.timeout_secs
        );
    }

    #[test]
    fn test_list_marks_changed_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");

        let untouched = output(ConfigCommands::List { changed: true }, &path).unwrap();
        assert_eq!(untouched, "All settings are at their defaults\n");

        output(
            ConfigCommands::Set {
                key: key("nominatim.min_interval_ms"),
                value: "2000".to_string(),
            },
            &path,
        )
        .unwrap();

        let changed = output(ConfigCommands::List { changed: true }, &path).unwrap();
        assert_eq!(changed, "[nominatim]\n* min_interval_ms = 2000\n");

        let full = output(ConfigCommands::List { changed: false }, &path).unwrap();
        assert!(full.contains("[prefetch]"));
        assert!(full.contains("* min_interval_ms = 2000"));
        assert!(full.contains("  corridor_radius_m = 500"));
    }
}
