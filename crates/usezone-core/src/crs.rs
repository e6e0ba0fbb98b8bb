// crates/usezone-core/src/crs.rs

//! # Coordinate reference systems
//!
//! The dataset ships its projection as a `.prj` WKT sidecar. We resolve the
//! WKT name against a fixed registry of reference systems this application
//! knows about: WGS84, the JGD2000/JGD2011 geographic systems, and the
//! nineteen Japan Plane Rectangular zones of each datum. Anything else is an
//! [`ZoneError::UnknownCrs`]; supporting arbitrary projections is out of
//! scope.

use std::fmt;

use once_cell::sync::Lazy;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;

use crate::error::{Result, ZoneError};

const WGS84_PROJ: &str = "+proj=longlat +datum=WGS84 +no_defs";

struct KnownCrs {
    epsg: u16,
    /// Angular (lat/long) systems transform in radians on both sides.
    angular: bool,
    names: Vec<String>,
}

static KNOWN_CRS: Lazy<Vec<KnownCrs>> = Lazy::new(|| {
    const ROMAN: [&str; 19] = [
        "i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x", "xi", "xii", "xiii", "xiv",
        "xv", "xvi", "xvii", "xviii", "xix",
    ];

    let mut table = vec![
        KnownCrs {
            epsg: 4326,
            angular: true,
            names: vec!["wgs84".into(), "gcswgs1984".into(), "wgs1984".into()],
        },
        KnownCrs {
            epsg: 4612,
            angular: true,
            names: vec!["jgd2000".into(), "gcsjgd2000".into()],
        },
        KnownCrs {
            epsg: 6668,
            angular: true,
            names: vec!["jgd2011".into(), "gcsjgd2011".into()],
        },
    ];

    // Japan Plane Rectangular CS zones I..XIX, ESRI and OGC spellings.
    for (idx, roman) in ROMAN.iter().enumerate() {
        let zone = idx + 1;
        table.push(KnownCrs {
            epsg: 2443 + idx as u16,
            angular: false,
            names: vec![
                format!("jgd2000japanzone{zone}"),
                format!("jgd2000japanplanerectangularcs{roman}"),
            ],
        });
        table.push(KnownCrs {
            epsg: 6669 + idx as u16,
            angular: false,
            names: vec![
                format!("jgd2011japanzone{zone}"),
                format!("jgd2011japanplanerectangularcs{roman}"),
            ],
        });
    }

    table
});

/// First quoted token of the WKT, i.e. the PROJCS/GEOGCS name.
fn wkt_name(wkt: &str) -> Option<&str> {
    let start = wkt.find('"')? + 1;
    let rest = &wkt[start..];
    Some(&rest[..rest.find('"')?])
}

/// Case/punctuation-insensitive key for name matching.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A resolved dataset reference system plus the machinery to move points in
/// and out of it.
pub struct DatasetCrs {
    epsg: u16,
    angular: bool,
    native: Proj,
    wgs84: Proj,
}

impl fmt::Debug for DatasetCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetCrs").field("epsg", &self.epsg).finish()
    }
}

impl DatasetCrs {
    /// Resolve a `.prj` WKT body against the registry.
    pub fn from_wkt(wkt: &str) -> Result<Self> {
        let name = wkt_name(wkt)
            .ok_or_else(|| ZoneError::UnknownCrs("projection metadata carries no name".into()))?;
        let key = normalize(name);
        let known = KNOWN_CRS
            .iter()
            .find(|c| c.names.iter().any(|n| *n == key))
            .ok_or_else(|| ZoneError::UnknownCrs(format!("unrecognized reference system: {name}")))?;
        Self::build(known)
    }

    /// Resolve a registry entry by EPSG code.
    pub fn from_epsg(epsg: u16) -> Result<Self> {
        let known = KNOWN_CRS
            .iter()
            .find(|c| c.epsg == epsg)
            .ok_or_else(|| ZoneError::UnknownCrs(format!("EPSG:{epsg} is not in the registry")))?;
        Self::build(known)
    }

    fn build(known: &KnownCrs) -> Result<Self> {
        let def = crs_definitions::from_code(known.epsg).ok_or_else(|| {
            ZoneError::UnknownCrs(format!("no projection definition for EPSG:{}", known.epsg))
        })?;
        let native =
            Proj::from_proj_string(def.proj4).map_err(|e| ZoneError::Projection(e.to_string()))?;
        let wgs84 =
            Proj::from_proj_string(WGS84_PROJ).map_err(|e| ZoneError::Projection(e.to_string()))?;
        Ok(Self {
            epsg: known.epsg,
            angular: known.angular,
            native,
            wgs84,
        })
    }

    pub fn epsg(&self) -> u16 {
        self.epsg
    }

    /// WGS84 lon/lat in degrees -> native coordinates.
    pub fn project_from_wgs84(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.wgs84, &self.native, &mut point)
            .map_err(|e| ZoneError::Projection(e.to_string()))?;
        if self.angular {
            Ok((point.0.to_degrees(), point.1.to_degrees()))
        } else {
            Ok((point.0, point.1))
        }
    }

    /// Native coordinates -> WGS84 lon/lat in degrees.
    pub fn unproject_to_wgs84(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = if self.angular {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.native, &self.wgs84, &mut point)
            .map_err(|e| ZoneError::Projection(e.to_string()))?;
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_the_projcs_name() {
        let wkt = r#"PROJCS["JGD_2011_Japan_Zone_9",GEOGCS["GCS_JGD_2011",DATUM["D_JGD_2011"]]]"#;
        assert_eq!(wkt_name(wkt), Some("JGD_2011_Japan_Zone_9"));
    }

    #[test]
    fn resolves_esri_and_ogc_spellings() {
        let esri = r#"PROJCS["JGD_2011_Japan_Zone_9",GEOGCS["GCS_JGD_2011"]]"#;
        assert_eq!(DatasetCrs::from_wkt(esri).unwrap().epsg(), 6677);

        let ogc = r#"PROJCS["JGD2000 / Japan Plane Rectangular CS IX",GEOGCS["JGD2000"]]"#;
        assert_eq!(DatasetCrs::from_wkt(ogc).unwrap().epsg(), 2451);

        let geographic = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984"]]"#;
        assert_eq!(DatasetCrs::from_wkt(geographic).unwrap().epsg(), 4326);
    }

    #[test]
    fn rejects_unknown_reference_systems() {
        let wkt = r#"PROJCS["NAD_1983_StatePlane_Vermont",GEOGCS["GCS_North_American_1983"]]"#;
        assert!(matches!(
            DatasetCrs::from_wkt(wkt),
            Err(ZoneError::UnknownCrs(_))
        ));
    }

    #[test]
    fn plane_rectangular_roundtrip_stays_put() {
        // Tokyo, against Japan Plane Rectangular CS IX (JGD2011).
        let crs = DatasetCrs::from_epsg(6677).unwrap();
        let (lon, lat) = (139.7530, 35.6936);

        let (x, y) = crs.project_from_wgs84(lon, lat).unwrap();
        // Zone IX origin sits at 139°50'E / 36°N, so Tokyo projects to small
        // offsets measured in meters.
        assert!(x.abs() < 100_000.0, "easting {x}");
        assert!(y.abs() < 100_000.0, "northing {y}");

        let (lon2, lat2) = crs.unproject_to_wgs84(x, y).unwrap();
        assert!((lon - lon2).abs() < 1e-6);
        assert!((lat - lat2).abs() < 1e-6);
    }

    #[test]
    fn geographic_crs_transforms_in_degrees() {
        let crs = DatasetCrs::from_epsg(4326).unwrap();
        let (x, y) = crs.project_from_wgs84(139.7530, 35.6936).unwrap();
        assert!((x - 139.7530).abs() < 1e-9);
        assert!((y - 35.6936).abs() < 1e-9);
    }
}
