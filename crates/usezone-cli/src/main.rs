//! usezone-cli — Command-line interface for usezone-core
//!
//! This binary looks up which urban-planning use zone covers a geographic
//! point and prints the zone's regulatory attributes. The point can be given
//! as explicit WGS84 coordinates or as a free-text address, which is
//! resolved through the GSI address-search service first.
//!
//! Usage examples
//! --------------
//!
//! - Show dataset statistics
//!   $ usezone-cli stats
//!
//! - Look up an address
//!   $ usezone-cli address "東京都千代田区九段北4-1-3"
//!
//! - Look up explicit coordinates
//!   $ usezone-cli point 35.693593 139.753012
//!
//! - Also write the result map as GeoJSON
//!   $ usezone-cli point 35.693593 139.753012 --map result.geojson
//!
//! Data source
//! -----------
//!
//! By default the CLI loads the use-zone shapefile bundle from
//! `shapefiles/用途地域.shp` next to the working directory. Use
//! `--input <path>` to point at a different `.shp`; its `.shx`, `.dbf`
//! and `.prj` sidecars are expected alongside.
mod args;

use std::path::Path;

use crate::args::{CliArgs, Commands};
use clap::Parser;
use usezone_core::{
    attribute_card, default_dataset_path, map_document, Geocoder, MatchTier, QueryPoint,
    ZoneDataset,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = CliArgs::parse();

    let input_path = args.input.unwrap_or_else(default_dataset_path);

    // A dataset that cannot be loaded is fatal; everything below assumes it.
    let dataset = ZoneDataset::load(&input_path)?;

    match args.command {
        Commands::Stats => {
            let stats = dataset.stats();
            println!("Dataset statistics:");
            println!("  Source: {}", dataset.source().display());
            println!("  Records: {}", stats.records);
            match stats.epsg {
                Some(code) => println!("  Reference system: EPSG:{code}"),
                None => println!("  Reference system: unresolved (.prj missing or unrecognized)"),
            }
            if let Some(secs) = stats.modified_unix {
                println!("  Modified (unix): {secs}");
            }
        }

        Commands::Address { query, map } => {
            let geocoder = Geocoder::new()?;
            match geocoder.resolve(&query) {
                Ok(hit) => {
                    println!("Geocoded: {}", hit.title);
                    match QueryPoint::new(hit.lat, hit.lon) {
                        Ok(point) => run_lookup(&dataset, point, map.as_deref())?,
                        Err(e) => eprintln!("Geocoder returned invalid coordinates: {e}"),
                    }
                }
                Err(e) => eprintln!("Geocoding failed: {e}"),
            }
        }

        Commands::Point { lat, lon, map } => match QueryPoint::new(lat, lon) {
            Ok(point) => run_lookup(&dataset, point, map.as_deref())?,
            Err(e) => eprintln!("Invalid coordinates: {e}"),
        },
    }

    Ok(())
}

fn run_lookup(dataset: &ZoneDataset, point: QueryPoint, map: Option<&Path>) -> anyhow::Result<()> {
    let lookup = dataset.locate(point)?;

    println!(
        "Query (WGS84): lat={:.6}, lon={:.6}",
        point.lat(),
        point.lon()
    );
    println!(
        "Native coordinates: x={:.4}, y={:.4}",
        lookup.projected.x, lookup.projected.y
    );

    match &lookup.tier {
        MatchTier::None => println!("No use zone found at this point."),
        MatchTier::Strict(records) => println!("Matched {} zone(s):", records.len()),
        MatchTier::Approximate(records) => println!(
            "Matched {} zone(s) on a zone boundary (approximate):",
            records.len()
        ),
    }

    for record in lookup.tier.records() {
        let card = attribute_card(record);
        println!();
        println!("Use zone: {} (code: {})", card.zone, card.code);
        for row in &card.rows {
            println!("  {}: {}", row.label, row.value);
        }
    }

    if let Some(path) = map {
        let doc = map_document(&lookup, dataset.crs());
        std::fs::write(path, doc.to_string())?;
        println!();
        println!("Map written to {}", path.display());
    }

    Ok(())
}
