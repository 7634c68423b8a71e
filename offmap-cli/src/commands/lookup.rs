//! Lookup commands - query cached data without network access.

use clap::{Subcommand, ValueEnum};
use offmap::coord::{BoundingBox, Coordinate};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Families that have geometry to filter by bounds.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum BoundsFamily {
    All,
    Roads,
    Water,
    Landuse,
}

/// Lookup subcommands.
#[derive(Debug, Subcommand)]
pub enum LookupCommands {
    /// Find the closest cached place name to a position
    #[command(allow_negative_numbers = true)]
    Place {
        /// Latitude in degrees
        lat: f64,

        /// Longitude in degrees
        lon: f64,

        /// Maximum distance in meters (default from config)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// List cached features inside a bounding box
    #[command(allow_negative_numbers = true)]
    Bounds {
        min_lat: f64,
        max_lat: f64,
        min_lon: f64,
        max_lon: f64,

        /// Restrict to one family
        #[arg(long, value_enum, default_value = "all")]
        family: BoundsFamily,
    },
}

/// Run a lookup subcommand.
pub fn run(command: LookupCommands) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    let service = runner.create_service()?;
    let lookup = service.lookup();

    match command {
        LookupCommands::Place {
            lat,
            lon,
            threshold,
        } => {
            let position = Coordinate::new(lat, lon);
            position
                .validate()
                .map_err(|e| CliError::Config(e.to_string()))?;
            let threshold =
                threshold.unwrap_or(runner.config().lookup.place_threshold_m);

            match lookup.nearest_place(position, threshold) {
                Some(nearest) => {
                    let place = &nearest.place;
                    println!("{}", place.display_name);
                    println!("  Distance: {:.0} m", nearest.distance_m);
                    println!("  Cached at: {}", place.coordinate);
                    if let Some(ref region) = place.region {
                        println!("  Region:   {}", region);
                    }
                    if let Some(ref country) = place.country {
                        println!("  Country:  {}", country);
                    }
                    if let Some(ref postcode) = place.postcode {
                        println!("  Postcode: {}", postcode);
                    }
                }
                None => println!("No cached place within {} m", threshold),
            }
        }
        LookupCommands::Bounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            family,
        } => {
            let bounds = BoundingBox::new(min_lat, max_lat, min_lon, max_lon);
            let wants = |f: BoundsFamily| family == BoundsFamily::All || family == f;

            if wants(BoundsFamily::Roads) {
                let roads = lookup.roads_in_bounds(&bounds);
                println!("Roads: {}", roads.len());
                for road in roads {
                    println!(
                        "  {:>12}  {:<15} {:>4} pts  {}",
                        road.external_id,
                        road.highway_class,
                        road.geometry.len(),
                        road.name.as_deref().unwrap_or("-")
                    );
                }
            }
            if wants(BoundsFamily::Water) {
                let water = lookup.water_in_bounds(&bounds);
                println!("Water: {}", water.len());
                for feature in water {
                    println!(
                        "  {:>12}  {:<15} {:>4} pts  {}{}",
                        feature.external_id,
                        feature.water_type,
                        feature.geometry.len(),
                        feature.name.as_deref().unwrap_or("-"),
                        if feature.is_area { " (area)" } else { "" }
                    );
                }
            }
            if wants(BoundsFamily::Landuse) {
                let landuse = lookup.landuse_in_bounds(&bounds);
                println!("Landuse: {}", landuse.len());
                for feature in landuse {
                    println!(
                        "  {:>12}  {:<15} {:>4} pts  {}",
                        feature.external_id,
                        feature.landuse_type,
                        feature.geometry.len(),
                        feature.name.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}
