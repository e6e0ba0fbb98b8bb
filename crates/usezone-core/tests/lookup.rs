//! End-to-end checks over the public API: loader failure modes and the
//! full point-lookup flow against an in-memory dataset.

use geo::{LineString, MultiPolygon, Polygon};
use usezone_core::{
    attribute_card, map_document, AttrValue, DatasetCrs, MatchTier, QueryPoint, ZoneAttributes,
    ZoneDataset, ZoneError, ZoneRecord,
};

fn zone(x0: f64, y0: f64, size: f64, code: f64, far: f64) -> ZoneRecord {
    let exterior = LineString::from(vec![
        (x0, y0),
        (x0 + size, y0),
        (x0 + size, y0 + size),
        (x0, y0 + size),
        (x0, y0),
    ]);
    let mut attributes = ZoneAttributes::empty();
    attributes.zone_code = AttrValue::Number(code);
    attributes.floor_area_ratio = AttrValue::Number(far);
    ZoneRecord {
        geometry: MultiPolygon::new(vec![Polygon::new(exterior, vec![])]),
        attributes,
    }
}

#[test]
fn missing_dataset_is_reported_with_the_missing_components() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("use_zones.shp");

    let err = ZoneDataset::load(&path).unwrap_err();
    match err {
        ZoneError::DatasetNotFound(message) => {
            assert!(message.contains("use_zones.shp"), "{message}");
        }
        other => panic!("expected DatasetNotFound, got {other}"),
    }
}

#[test]
fn partial_shapefile_bundles_name_the_missing_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("use_zones.shp");
    std::fs::write(&path, b"").unwrap();
    std::fs::write(dir.path().join("use_zones.shx"), b"").unwrap();

    let err = ZoneDataset::load(&path).unwrap_err();
    match err {
        ZoneError::DatasetNotFound(message) => {
            assert!(message.contains("use_zones.dbf"), "{message}");
            assert!(!message.contains("use_zones.shx,"), "{message}");
        }
        other => panic!("expected DatasetNotFound, got {other}"),
    }
}

#[test]
fn lookup_flow_from_point_to_rendered_card() {
    // Geographic CRS keeps the fixture coordinates readable: native == lon/lat.
    let crs = DatasetCrs::from_epsg(4326).unwrap();
    let dataset = ZoneDataset::from_records(
        vec![
            zone(139.0, 35.0, 0.5, 9.0, 400.0),
            zone(139.5, 35.0, 0.5, 11.0, 200.0),
        ],
        Some(crs),
    );

    assert_eq!(dataset.stats().records, 2);
    assert_eq!(dataset.stats().epsg, Some(4326));

    // Strictly inside the first zone.
    let lookup = dataset
        .locate(QueryPoint::new(35.25, 139.25).unwrap())
        .unwrap();
    let records = match &lookup.tier {
        MatchTier::Strict(records) => records,
        other => panic!("expected strict, got {}", other.label()),
    };
    assert_eq!(records.len(), 1);

    let card = attribute_card(records[0]);
    assert_eq!(card.zone, "商業地域");
    assert_eq!(card.code, "9");
    assert!(card
        .rows
        .iter()
        .any(|row| row.label == "floor-area ratio" && row.value == "400%"));

    // The map carries the point and the matched outline.
    let doc = map_document(&lookup, dataset.crs());
    match doc {
        geojson::GeoJson::FeatureCollection(fc) => assert_eq!(fc.features.len(), 2),
        other => panic!("expected a feature collection, got {other:?}"),
    }
}

#[test]
fn boundary_point_returns_the_approximate_tier() {
    let crs = DatasetCrs::from_epsg(4326).unwrap();
    let dataset = ZoneDataset::from_records(
        vec![
            zone(139.0, 35.0, 0.5, 1.0, 80.0),
            zone(139.5, 35.0, 0.5, 2.0, 100.0),
        ],
        Some(crs),
    );

    // Exactly on the shared edge at lon 139.5.
    let lookup = dataset
        .locate(QueryPoint::new(35.25, 139.5).unwrap())
        .unwrap();
    match &lookup.tier {
        MatchTier::Approximate(records) => assert_eq!(records.len(), 2),
        other => panic!("expected approximate, got {}", other.label()),
    }
}

#[test]
fn sea_point_renders_a_point_only_map() {
    let crs = DatasetCrs::from_epsg(4326).unwrap();
    let dataset = ZoneDataset::from_records(vec![zone(139.0, 35.0, 0.5, 1.0, 80.0)], Some(crs));

    let lookup = dataset
        .locate(QueryPoint::new(30.0, 145.0).unwrap())
        .unwrap();
    assert!(lookup.tier.is_empty());

    let doc = map_document(&lookup, dataset.crs());
    match doc {
        geojson::GeoJson::FeatureCollection(fc) => {
            assert_eq!(fc.features.len(), 1);
            let props = fc.features[0].properties.as_ref().unwrap();
            assert_eq!(props["role"], "query-point");
        }
        other => panic!("expected a feature collection, got {other:?}"),
    }
}
