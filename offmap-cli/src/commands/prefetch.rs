//! Prefetch command - cache map data along a route file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use offmap::coord::RouteGeometry;
use offmap::prefetch::{progress_channel, ProgressReceiver};
use offmap::PrefetchError;
use tokio_util::sync::CancellationToken;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Which feature families to fetch.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FamilySelection {
    /// Roads, water, landuse, then place names
    All,
    Roads,
    Water,
    Landuse,
    Places,
}

/// Arguments for the prefetch command.
pub struct PrefetchArgs {
    pub route: PathBuf,
    pub route_id: Option<String>,
    pub family: FamilySelection,
}

/// Route id precedence: flag, id embedded in the file, file stem.
fn resolve_route_id(cli: Option<String>, embedded: Option<String>, path: &Path) -> String {
    cli.or(embedded).unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "route".to_string())
    })
}

/// Run the prefetch command.
pub fn run(args: PrefetchArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("prefetch");

    let (embedded_id, geometry) = RouteGeometry::load(&args.route)?;
    let route_id = resolve_route_id(args.route_id, embedded_id, &args.route);

    println!("offmap prefetch v{}", offmap::VERSION);
    println!("Route:    {} ({})", route_id, args.route.display());
    println!(
        "Points:   {} ({:.1} km)",
        geometry.len(),
        geometry.length_m() / 1000.0
    );
    println!(
        "Corridor: {} m radius",
        runner.config().prefetch.corridor_radius_m
    );
    println!();
    println!("Press Ctrl+C to stop; partial results are kept.");
    println!();

    let service = runner.create_service()?;

    let cancellation = CancellationToken::new();
    let handler_token = cancellation.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Cancelling prefetch...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let (tx, rx) = progress_channel();
    let reporter = runner.runtime().spawn(show_progress(rx));

    let points = geometry.points();
    let id = route_id.as_str();
    let result = runner.block_on(async {
        let progress = Some(&tx);
        let token = &cancellation;
        match args.family {
            FamilySelection::All => service
                .prefetch_all(id, points, progress, token)
                .await
                .map(|summary| {
                    vec![
                        ("roads", summary.roads),
                        ("water", summary.water),
                        ("landuse", summary.landuse),
                        ("places", summary.places),
                    ]
                }),
            FamilySelection::Roads => service
                .prefetch_roads(id, points, progress, token)
                .await
                .map(|n| vec![("roads", n)]),
            FamilySelection::Water => service
                .prefetch_water(id, points, progress, token)
                .await
                .map(|n| vec![("water", n)]),
            FamilySelection::Landuse => service
                .prefetch_landuse(id, points, progress, token)
                .await
                .map(|n| vec![("landuse", n)]),
            FamilySelection::Places => service
                .prefetch_places(id, points, progress, token)
                .await
                .map(|n| vec![("places", n)]),
        }
    });

    // Closing the channel lets the reporter finish its bars
    drop(tx);
    let _ = runner.block_on(reporter);

    match result {
        Ok(counts) => {
            println!();
            println!("Cached for route '{}':", route_id);
            for (family, count) in counts {
                println!("  {:<8} {}", family, count);
            }
            Ok(())
        }
        Err(PrefetchError::Cancelled { features_cached }) => {
            println!();
            println!(
                "Prefetch cancelled; {} records kept for the interrupted family.",
                features_cached
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Draw one progress bar per family until the channel closes.
async fn show_progress(mut rx: ProgressReceiver) {
    let multi = MultiProgress::new();
    let style = ProgressStyle::with_template(
        "{prefix:>8} [{bar:30.cyan/blue}] {pos}/{len} points, {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("=> ");

    let mut bars: HashMap<&'static str, ProgressBar> = HashMap::new();

    while let Some(event) = rx.recv().await {
        let bar = bars.entry(event.family).or_insert_with(|| {
            let bar = multi.add(ProgressBar::new(event.total as u64));
            bar.set_style(style.clone());
            bar.set_prefix(event.family);
            bar
        });

        bar.set_length(event.total as u64);
        bar.set_position(event.current as u64);
        bar.set_message(format!("{} found", event.found));
        if event.complete {
            bar.finish();
        }
    }

    for bar in bars.values() {
        if !bar.is_finished() {
            bar.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_id_precedence() {
        let path = Path::new("/tmp/morning-commute.json");
        assert_eq!(
            resolve_route_id(Some("cli".into()), Some("file".into()), path),
            "cli"
        );
        assert_eq!(resolve_route_id(None, Some("file".into()), path), "file");
        assert_eq!(resolve_route_id(None, None, path), "morning-commute");
    }
}
