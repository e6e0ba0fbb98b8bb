//! Error handling example for usezone-core
//!
//! This example demonstrates the failure modes a frontend has to deal with
//! and which of them are recoverable.

use usezone_core::{Geocoder, QueryPoint, ZoneDataset, ZoneError};

fn main() {
    env_logger::init();
    println!("=== usezone-core Error Handling Example ===\n");

    // Example 1: Dataset load failures are fatal to the session
    println!("--- Example 1: Loading a dataset that does not exist ---");
    match ZoneDataset::load("nowhere/use_zones.shp") {
        Ok(dataset) => println!("✓ Loaded {} records", dataset.stats().records),
        Err(e) => println!("✗ {e}"),
    }
    println!();

    // Example 2: Coordinate validation happens before any lookup
    println!("--- Example 2: Out-of-range coordinates ---");
    for (lat, lon) in [(95.0, 139.0), (35.0, 200.0)] {
        match QueryPoint::new(lat, lon) {
            Ok(_) => println!("  accepted ({lat}, {lon})"),
            Err(e) => println!("  rejected ({lat}, {lon}): {e}"),
        }
    }
    println!();

    // Example 3: Geocoding errors are recoverable and distinct
    println!("--- Example 3: Geocoding failure kinds ---");
    let geocoder = match Geocoder::new() {
        Ok(g) => g,
        Err(e) => {
            println!("✗ cannot build the HTTP client: {e}");
            return;
        }
    };
    match geocoder.resolve("") {
        Err(ZoneError::EmptyAddress) => println!("  empty input rejected locally"),
        other => println!("  unexpected: {other:?}"),
    }
    match geocoder.resolve("存在しない住所XYZ123") {
        Ok(hit) => println!("  resolved: {} ({}, {})", hit.title, hit.lat, hit.lon),
        Err(ZoneError::GeocodeTimeout) => println!("  timed out"),
        Err(ZoneError::GeocodeConnection(e)) => println!("  connection failed: {e}"),
        Err(ZoneError::GeocodeNoResult(a)) => println!("  no result for {a}"),
        Err(e) => println!("  other failure: {e}"),
    }
}
