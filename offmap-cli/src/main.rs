//! offmap CLI - prefetch and query offline map data.
//!
//! This binary wraps the `offmap` library: `prefetch` fills the cache along a
//! route file, `lookup` reads it back without network access, and `cache` /
//! `config` manage local state.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::cache::CacheAction;
use commands::config::ConfigCommands;
use commands::lookup::LookupCommands;
use commands::prefetch::{FamilySelection, PrefetchArgs};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "offmap", version, about = "Offline map cache for route-following devices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch and cache map data along a route
    Prefetch {
        /// Route file: [[lat, lon], ...] or {"routeId": ..., "coordinates": [...]}
        route: PathBuf,

        /// Route id to cache under (default: id in the file, then file name)
        #[arg(long)]
        route_id: Option<String>,

        /// Feature families to fetch
        #[arg(long, value_enum, default_value = "all")]
        family: FamilySelection,
    },

    /// Query the offline cache
    Lookup {
        #[command(subcommand)]
        command: LookupCommands,
    },

    /// Manage cached routes
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Prefetch {
            route,
            route_id,
            family,
        } => commands::prefetch::run(PrefetchArgs {
            route,
            route_id,
            family,
        }),
        Commands::Lookup { command } => commands::lookup::run(command),
        Commands::Cache { action } => commands::cache::run(action),
        Commands::Config { command } => commands::config::run(command),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_lookup_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["offmap", "lookup", "place", "-33.86", "151.21"]).unwrap();
        match cli.command {
            Commands::Lookup {
                command: LookupCommands::Place { lat, lon, threshold },
            } => {
                assert_eq!(lat, -33.86);
                assert_eq!(lon, 151.21);
                assert!(threshold.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_config_keys_are_checked_while_parsing() {
        assert!(Cli::try_parse_from(["offmap", "config", "get", "prefetch.bogus"]).is_err());

        let cli = Cli::try_parse_from(["offmap", "config", "reset", "lookup.place_threshold_m"])
            .unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Reset { key },
            } => assert_eq!(key.name(), "lookup.place_threshold_m"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_prefetch_family_flag() {
        let cli =
            Cli::try_parse_from(["offmap", "prefetch", "ride.json", "--family", "water"]).unwrap();
        match cli.command {
            Commands::Prefetch { family, .. } => assert_eq!(family, FamilySelection::Water),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
