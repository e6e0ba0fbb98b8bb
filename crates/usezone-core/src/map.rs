// crates/usezone-core/src/map.rs

//! Map document construction.
//!
//! The map is a GeoJSON feature collection: the query point in WGS84 plus
//! one outlined polygon per matched record. Frontends hand it to whatever
//! map widget they have. Outline reprojection is best-effort; when it
//! fails the document degrades to the point alone.

use geo::{Coord, MapCoords, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject};
use log::warn;

use crate::crs::DatasetCrs;
use crate::error::{Result, ZoneError};
use crate::format;
use crate::locate::{Lookup, QueryPoint};
use crate::model::ZoneRecord;

/// Default view zoom for a single-point result.
pub const MAP_ZOOM: u8 = 16;

/// Build the map document for a lookup. Never fails: polygon outlines that
/// cannot be produced are dropped with a warning.
pub fn map_document(lookup: &Lookup<'_>, crs: Option<&DatasetCrs>) -> GeoJson {
    let mut features = vec![point_feature(lookup.point)];

    if let Some(crs) = crs {
        for record in lookup.tier.records() {
            match outline_feature(record, crs) {
                Ok(feature) => features.push(feature),
                Err(e) => warn!("dropping polygon outline from map: {e}"),
            }
        }
    } else if !lookup.tier.is_empty() {
        warn!("no reference system for outlines, rendering point-only map");
    }

    GeoJson::FeatureCollection(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

fn point_feature(point: QueryPoint) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("role".into(), "query-point".into());
    properties.insert("zoom".into(), MAP_ZOOM.into());
    properties.insert("lat".into(), point.lat().into());
    properties.insert("lon".into(), point.lon().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            point.lon(),
            point.lat(),
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn outline_feature(record: &ZoneRecord, crs: &DatasetCrs) -> Result<Feature> {
    let wgs84: MultiPolygon<f64> = record
        .geometry
        .try_map_coords(|c: Coord<f64>| -> Result<Coord<f64>> {
            let (lon, lat) = crs.unproject_to_wgs84(c.x, c.y)?;
            Ok(Coord { x: lon, y: lat })
        })
        .map_err(|e| ZoneError::MapRender(e.to_string()))?;

    let mut properties = JsonObject::new();
    properties.insert("role".into(), "matched-zone".into());
    properties.insert(
        "zone".into(),
        format::zone_label(&record.attributes.zone_code).into(),
    );

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::from(&wgs84))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    })
}
