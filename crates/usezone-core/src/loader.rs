// crates/usezone-core/src/loader.rs

//! # Dataset loader
//!
//! Handles the physical layer: reads the polygon dataset (geometry +
//! attribute table + projection sidecar) from disk, builds the spatial
//! index, and memoizes the result per path for the life of the process.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::UNIX_EPOCH;

use geo::{BoundingRect, MultiPolygon};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::crs::DatasetCrs;
use crate::error::{Result, ZoneError};
use crate::model::{
    AttrValue, DatasetStats, ZoneAttributes, ZoneRecord, COL_BUILDING_COVERAGE,
    COL_FLOOR_AREA_RATIO, COL_HEIGHT_LIMIT, COL_MIN_LOT_AREA, COL_SETBACK, COL_SPECIAL_FAR,
    COL_ZONE_CODE,
};

/// Default dataset location, relative to the working directory.
pub const DEFAULT_DATASET_DIR: &str = "shapefiles";
pub const DEFAULT_DATASET_FILENAME: &str = "用途地域.shp";

pub fn default_dataset_path() -> PathBuf {
    Path::new(DEFAULT_DATASET_DIR).join(DEFAULT_DATASET_FILENAME)
}

static DATASET_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<ZoneDataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Spatial-index node: the bounding box of one record. Broad phase only;
/// exact geometry tests run against the record itself.
struct Envelope {
    bbox: AABB<[f64; 2]>,
    record: usize,
}

impl RTreeObject for Envelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

impl PointDistance for Envelope {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        self.bbox.distance_2(point)
    }
}

/// The loaded, immutable polygon dataset plus its spatial index.
pub struct ZoneDataset {
    records: Vec<ZoneRecord>,
    tree: RTree<Envelope>,
    crs: Option<DatasetCrs>,
    source: PathBuf,
    modified_unix: Option<u64>,
}

impl ZoneDataset {
    /// Memoized load: the first call per path reads from storage, every
    /// later call for the same path returns the cached dataset.
    pub fn load(path: impl AsRef<Path>) -> Result<Arc<Self>> {
        let path = path.as_ref();
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let mut cache = DATASET_CACHE.lock().expect("dataset cache poisoned");
        if let Some(dataset) = cache.get(&key) {
            debug!("dataset cache hit: {}", key.display());
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(Self::read_from_path(path)?);
        cache.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Uncached read. Prefer [`ZoneDataset::load`].
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let shp = path.as_ref();
        check_components(shp)?;

        let crs = read_crs(shp);
        let records = read_records(shp)?;
        if records.is_empty() {
            return Err(ZoneError::DatasetParse {
                path: shp.to_path_buf(),
                message: "no polygon records".into(),
            });
        }
        let tree = build_index(&records);

        let modified_unix = fs::metadata(shp)
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs());

        info!(
            "dataset loaded: {} records from {}",
            records.len(),
            shp.display()
        );
        Ok(Self {
            records,
            tree,
            crs,
            source: shp.to_path_buf(),
            modified_unix,
        })
    }

    /// Build a dataset from already-materialized records, no storage access.
    pub fn from_records(records: Vec<ZoneRecord>, crs: Option<DatasetCrs>) -> Self {
        let tree = build_index(&records);
        Self {
            records,
            tree,
            crs,
            source: PathBuf::new(),
            modified_unix: None,
        }
    }

    pub fn records(&self) -> &[ZoneRecord] {
        &self.records
    }

    pub fn crs(&self) -> Option<&DatasetCrs> {
        self.crs.as_ref()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            records: self.records.len(),
            epsg: self.crs.as_ref().map(|c| c.epsg()),
            modified_unix: self.modified_unix,
        }
    }

    /// Broad-phase candidates whose bounding box covers the native point,
    /// in record order.
    pub(crate) fn candidates_at(&self, x: f64, y: f64) -> Vec<&ZoneRecord> {
        let mut indices: Vec<usize> = self
            .tree
            .locate_all_at_point(&[x, y])
            .map(|e| e.record)
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices.into_iter().map(|i| &self.records[i]).collect()
    }
}

/// A shapefile is a bundle; geometry, index and attribute table must all be
/// present before we try to parse anything.
fn check_components(shp: &Path) -> Result<()> {
    let mut missing = Vec::new();
    for ext in ["shp", "shx", "dbf"] {
        let component = shp.with_extension(ext);
        if !component.exists() {
            missing.push(
                component
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| component.display().to_string()),
            );
        }
    }
    if missing.is_empty() {
        return Ok(());
    }

    // Deployment aid: show what actually sits next to the expected file.
    if let Some(dir) = shp.parent().filter(|p| !p.as_os_str().is_empty()) {
        match fs::read_dir(dir) {
            Ok(entries) => {
                let found: Vec<String> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.file_name().to_string_lossy().into_owned())
                    .collect();
                warn!("dataset directory {} contains: {found:?}", dir.display());
            }
            Err(e) => warn!("dataset directory {} is not readable: {e}", dir.display()),
        }
    }

    Err(ZoneError::DatasetNotFound(format!(
        "{} (missing {})",
        shp.display(),
        missing.join(", ")
    )))
}

fn read_crs(shp: &Path) -> Option<DatasetCrs> {
    let prj = shp.with_extension("prj");
    let wkt = match fs::read_to_string(&prj) {
        Ok(wkt) => wkt,
        Err(e) => {
            warn!("no projection sidecar at {}: {e}", prj.display());
            return None;
        }
    };
    match DatasetCrs::from_wkt(&wkt) {
        Ok(crs) => {
            info!("dataset reference system: EPSG:{}", crs.epsg());
            Some(crs)
        }
        Err(e) => {
            warn!("cannot resolve projection metadata: {e}");
            None
        }
    }
}

fn read_records(shp: &Path) -> Result<Vec<ZoneRecord>> {
    let parse_err = |message: String| ZoneError::DatasetParse {
        path: shp.to_path_buf(),
        message,
    };

    let shape_reader =
        shapefile::ShapeReader::from_path(shp).map_err(|e| parse_err(e.to_string()))?;

    // The attribute table ships in CP932 (Windows Shift_JIS).
    let encoding = dbase::encoding::EncodingRs::from(encoding_rs::SHIFT_JIS);
    let dbf_reader = dbase::Reader::from_path_with_encoding(shp.with_extension("dbf"), encoding)
        .map_err(|e| parse_err(e.to_string()))?;

    let mut reader = shapefile::Reader::new(shape_reader, dbf_reader);
    let mut records = Vec::new();
    for pair in reader.iter_shapes_and_records() {
        let (shape, record) = pair.map_err(|e| parse_err(e.to_string()))?;
        match shape {
            shapefile::Shape::Polygon(polygon) => {
                let geometry: MultiPolygon<f64> = polygon.into();
                records.push(ZoneRecord {
                    geometry,
                    attributes: read_attributes(&record),
                });
            }
            other => {
                warn!("skipping non-polygon shape: {:?}", other.shapetype());
            }
        }
    }
    Ok(records)
}

fn read_attributes(record: &dbase::Record) -> ZoneAttributes {
    ZoneAttributes {
        zone_code: field_value(record, COL_ZONE_CODE),
        floor_area_ratio: field_value(record, COL_FLOOR_AREA_RATIO),
        building_coverage: field_value(record, COL_BUILDING_COVERAGE),
        setback: field_value(record, COL_SETBACK),
        min_lot_area: field_value(record, COL_MIN_LOT_AREA),
        special_far_district: field_value(record, COL_SPECIAL_FAR),
        height_limit: field_value(record, COL_HEIGHT_LIMIT),
    }
}

/// Collapse one dbf field into the display model, preserving whatever the
/// table actually held.
fn field_value(record: &dbase::Record, column: &str) -> AttrValue {
    let Some(value) = record.get(column) else {
        return AttrValue::Missing;
    };
    match value {
        dbase::FieldValue::Numeric(Some(v)) => AttrValue::Number(*v),
        dbase::FieldValue::Numeric(None) => AttrValue::Missing,
        dbase::FieldValue::Float(Some(v)) => AttrValue::Number(f64::from(*v)),
        dbase::FieldValue::Float(None) => AttrValue::Missing,
        dbase::FieldValue::Integer(v) => AttrValue::Number(f64::from(*v)),
        dbase::FieldValue::Double(v) => AttrValue::Number(*v),
        dbase::FieldValue::Character(Some(s)) => {
            let s = s.trim();
            if s.is_empty() {
                AttrValue::Missing
            } else {
                AttrValue::Text(s.to_string())
            }
        }
        dbase::FieldValue::Character(None) => AttrValue::Missing,
        dbase::FieldValue::Logical(Some(b)) => AttrValue::Flag(*b),
        dbase::FieldValue::Logical(None) => AttrValue::Missing,
        other => AttrValue::Text(other.to_string()),
    }
}

fn build_index(records: &[ZoneRecord]) -> RTree<Envelope> {
    let nodes = records
        .iter()
        .enumerate()
        .filter_map(|(record, r)| {
            let rect = r.geometry.bounding_rect()?;
            Some(Envelope {
                bbox: AABB::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                ),
                record,
            })
        })
        .collect();
    RTree::bulk_load(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbase::FieldValue;

    fn record_with(column: &str, value: FieldValue) -> dbase::Record {
        let mut record = dbase::Record::default();
        record.insert(column.to_string(), value);
        record
    }

    #[test]
    fn numeric_fields_become_numbers() {
        let record = record_with(COL_ZONE_CODE, FieldValue::Numeric(Some(9.0)));
        assert_eq!(field_value(&record, COL_ZONE_CODE), AttrValue::Number(9.0));
    }

    #[test]
    fn absent_columns_and_null_values_are_missing() {
        let record = record_with(COL_ZONE_CODE, FieldValue::Numeric(None));
        assert_eq!(field_value(&record, COL_ZONE_CODE), AttrValue::Missing);
        assert_eq!(field_value(&record, COL_HEIGHT_LIMIT), AttrValue::Missing);
    }

    #[test]
    fn character_fields_keep_their_text() {
        let record = record_with(COL_FLOOR_AREA_RATIO, FieldValue::Character(Some("abc".into())));
        assert_eq!(
            field_value(&record, COL_FLOOR_AREA_RATIO),
            AttrValue::Text("abc".into())
        );

        let blank = record_with(COL_FLOOR_AREA_RATIO, FieldValue::Character(Some("  ".into())));
        assert_eq!(field_value(&blank, COL_FLOOR_AREA_RATIO), AttrValue::Missing);
    }
}
