// crates/usezone-core/src/model.rs

use geo::MultiPolygon;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Attribute table layout
// ---------------------------------------------------------------------------

/// Use-zone classification code (1..=12).
pub const COL_ZONE_CODE: &str = "TUP3F1";
/// Floor-area ratio, percent.
pub const COL_FLOOR_AREA_RATIO: &str = "TUP3F3";
/// Building-coverage ratio, percent.
pub const COL_BUILDING_COVERAGE: &str = "TUP3F4";
/// Minimum setback distance, meters.
pub const COL_SETBACK: &str = "TUP3F5";
/// Minimum lot size, square meters.
pub const COL_MIN_LOT_AREA: &str = "TUP3F6";
/// Special floor-area-ratio district flag, 0/1.
pub const COL_SPECIAL_FAR: &str = "TUP3F7";
/// Height limit, meters.
pub const COL_HEIGHT_LIMIT: &str = "TAKASA";

/// The fixed legal classification table. Codes outside this table are
/// displayed as "unknown code (N)", never treated as an error.
pub const USE_ZONE_NAMES: [(i64, &str); 12] = [
    (1, "第1種低層住居専用地域"),
    (2, "第2種低層住居専用地域"),
    (3, "第1種中高層住居専用地域"),
    (4, "第2種中高層住居専用地域"),
    (5, "第1種住居地域"),
    (6, "第2種住居地域"),
    (7, "準住居地域"),
    (8, "近隣商業地域"),
    (9, "商業地域"),
    (10, "準工業地域"),
    (11, "工業地域"),
    (12, "工業専用地域"),
];

pub fn use_zone_name(code: i64) -> Option<&'static str> {
    USE_ZONE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A regulatory attribute as it came out of the attribute table.
///
/// The loader does not coerce: whatever the table held is preserved, so the
/// display layer can report per-attribute coercion problems instead of
/// failing the whole record.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Flag(bool),
    Missing,
}

impl AttrValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Integral numbers only; "9.0" is code 9, "9.5" is no code at all.
    pub fn as_code(&self) -> Option<i64> {
        match self {
            AttrValue::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttrValue::Missing)
    }
}

/// The regulatory attributes of one zone polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneAttributes {
    pub zone_code: AttrValue,
    pub floor_area_ratio: AttrValue,
    pub building_coverage: AttrValue,
    pub setback: AttrValue,
    pub min_lot_area: AttrValue,
    pub special_far_district: AttrValue,
    pub height_limit: AttrValue,
}

impl ZoneAttributes {
    pub fn empty() -> Self {
        Self {
            zone_code: AttrValue::Missing,
            floor_area_ratio: AttrValue::Missing,
            building_coverage: AttrValue::Missing,
            setback: AttrValue::Missing,
            min_lot_area: AttrValue::Missing,
            special_far_district: AttrValue::Missing,
            height_limit: AttrValue::Missing,
        }
    }
}

/// One zone polygon in the dataset CRS, plus its attributes.
#[derive(Debug, Clone)]
pub struct ZoneRecord {
    pub geometry: MultiPolygon<f64>,
    pub attributes: ZoneAttributes,
}

/// Simple aggregate statistics for a loaded dataset.
///
/// Returned by [`crate::ZoneDataset::stats`]; counts reflect the materialized
/// in-memory dataset.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DatasetStats {
    pub records: usize,
    /// Resolved reference system, when the `.prj` sidecar was recognized.
    pub epsg: Option<u16>,
    /// Source file mtime, seconds since the Unix epoch.
    pub modified_unix: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_names_cover_codes_1_through_12() {
        for code in 1..=12 {
            assert!(use_zone_name(code).is_some(), "missing name for {code}");
        }
        assert_eq!(use_zone_name(9), Some("商業地域"));
    }

    #[test]
    fn codes_outside_the_table_have_no_name() {
        assert_eq!(use_zone_name(0), None);
        assert_eq!(use_zone_name(99), None);
    }

    #[test]
    fn as_code_accepts_integral_numbers_only() {
        assert_eq!(AttrValue::Number(9.0).as_code(), Some(9));
        assert_eq!(AttrValue::Number(9.5).as_code(), None);
        assert_eq!(AttrValue::Number(f64::NAN).as_code(), None);
        assert_eq!(AttrValue::Text("9".into()).as_code(), None);
        assert_eq!(AttrValue::Missing.as_code(), None);
    }
}
