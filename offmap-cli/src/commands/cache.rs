//! Cache management CLI commands.

use clap::Subcommand;
use offmap::store::StoreStats;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Remove cached routes (all of them unless --route-id is given)
    Clear {
        /// Only clear this route
        #[arg(long)]
        route_id: Option<String>,
    },
    /// Show cached routes and record counts
    Stats,
}

/// Run a cache subcommand.
pub fn run(action: CacheAction) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let service = runner.create_service()?;
    let cache_dir = &runner.config().cache.directory;

    match action {
        CacheAction::Clear { route_id: Some(id) } => {
            if service.clear_route(&id)? {
                println!("Cleared route '{}'", id);
            } else {
                println!("Route '{}' is not cached", id);
            }
        }
        CacheAction::Clear { route_id: None } => {
            println!("Clearing offline cache at: {}", cache_dir.display());
            let removed = service.clear_all()?;
            println!("Deleted {} route files", removed);
        }
        CacheAction::Stats => {
            println!("Offline cache: {}", cache_dir.display());
            let stats = service.stats();
            print_family("Roads", stats.roads);
            print_family("Water", stats.water);
            print_family("Landuse", stats.landuse);
            print_family("Places", stats.places);

            let routes = service.route_ids();
            if !routes.is_empty() {
                println!();
                println!("Routes:");
                for id in routes {
                    println!("  {}", id);
                }
            }
        }
    }

    Ok(())
}

fn print_family(label: &str, stats: StoreStats) {
    println!(
        "  {:<8} {} routes, {} records",
        label, stats.routes, stats.records
    );
}
