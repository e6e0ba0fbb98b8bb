//! Basic usage example for usezone-core
//!
//! This example demonstrates how to:
//! - Load the zone dataset (memoized per path)
//! - Look up a point by coordinates
//! - Render attribute cards and the map document

use usezone_core::{attribute_card, default_dataset_path, map_document, QueryPoint, ZoneDataset};

fn main() -> usezone_core::Result<()> {
    env_logger::init();
    println!("=== usezone-core Basic Usage Example ===\n");

    // Load the dataset (first call reads from disk, later calls are cached)
    println!("Loading zone dataset...");
    let dataset = ZoneDataset::load(default_dataset_path())?;
    let stats = dataset.stats();
    println!("✓ Dataset loaded successfully");
    println!("  Records: {}", stats.records);
    match stats.epsg {
        Some(code) => println!("  Reference system: EPSG:{code}"),
        None => println!("  Reference system: unresolved (.prj missing?)"),
    }
    println!();

    // Example 1: Look up a point near Kudankita, Chiyoda
    println!("--- Example 1: Coordinate lookup ---");
    let point = QueryPoint::new(35.6936, 139.7530)?;
    let lookup = dataset.locate(point)?;
    println!("Match tier: {}", lookup.tier.label());
    println!(
        "Native coordinates: ({:.4}, {:.4})",
        lookup.projected.x, lookup.projected.y
    );
    for record in lookup.tier.records() {
        let card = attribute_card(record);
        println!("Use zone: {} (code: {})", card.zone, card.code);
        for row in &card.rows {
            println!("  {}: {}", row.label, row.value);
        }
    }
    if lookup.tier.is_empty() {
        println!("No use zone found at this point.");
    }
    println!();

    // Example 2: Build the map document
    println!("--- Example 2: Map document ---");
    let doc = map_document(&lookup, dataset.crs());
    println!("{doc}");

    // Example 3: The cache
    println!("--- Example 3: Cache usage ---");
    let start = std::time::Instant::now();
    let _again = ZoneDataset::load(default_dataset_path())?;
    println!("Second load (from cache): {:?}", start.elapsed());

    Ok(())
}
