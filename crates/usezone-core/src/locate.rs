// crates/usezone-core/src/locate.rs

//! Point location: which zone polygons contain (or touch) a query point.

use geo::{Contains, Coord, Intersects, Point};
use log::debug;

use crate::error::{Result, ZoneError};
use crate::loader::ZoneDataset;
use crate::model::ZoneRecord;

/// A validated WGS84 query point. Construction is the only place range
/// checks happen; a `QueryPoint` that exists is in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryPoint {
    lat: f64,
    lon: f64,
}

impl QueryPoint {
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ZoneError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ZoneError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }
}

/// Which test produced the matched set.
///
/// `Approximate` exists because boundary floating-point precision in the
/// source polygons can make the strict containment test miss points sitting
/// exactly on a shared edge; those still intersect.
#[derive(Debug, Clone)]
pub enum MatchTier<'a> {
    /// No polygon contains or touches the point.
    None,
    /// Polygons whose interior strictly contains the point.
    Strict(Vec<&'a ZoneRecord>),
    /// Boundary fallback: nothing contained the point, these touch it.
    Approximate(Vec<&'a ZoneRecord>),
}

impl<'a> MatchTier<'a> {
    pub fn records(&self) -> &[&'a ZoneRecord] {
        match self {
            MatchTier::None => &[],
            MatchTier::Strict(records) | MatchTier::Approximate(records) => records,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::None => "none",
            MatchTier::Strict(_) => "strict",
            MatchTier::Approximate(_) => "approximate",
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MatchTier::None)
    }
}

/// One lookup answer: the dataset-native coordinates that were actually
/// tested, plus the matched records tagged by tier.
#[derive(Debug)]
pub struct Lookup<'a> {
    pub point: QueryPoint,
    pub projected: Coord<f64>,
    pub tier: MatchTier<'a>,
}

impl ZoneDataset {
    /// Locate the zone polygons for a query point.
    ///
    /// Broad phase via the spatial index, then strict containment, then the
    /// intersects fallback for boundary-adjacent points.
    pub fn locate(&self, point: QueryPoint) -> Result<Lookup<'_>> {
        let crs = self.crs().ok_or_else(|| {
            ZoneError::UnknownCrs(format!(
                "dataset {} has no recognized projection sidecar",
                self.source().display()
            ))
        })?;

        let (x, y) = crs.project_from_wgs84(point.lon(), point.lat())?;
        let native = Point::new(x, y);

        let candidates = self.candidates_at(x, y);
        debug!(
            "lookup at ({:.6}, {:.6}) -> native ({x:.4}, {y:.4}), {} candidates",
            point.lat(),
            point.lon(),
            candidates.len()
        );

        let strict: Vec<&ZoneRecord> = candidates
            .iter()
            .copied()
            .filter(|r| r.geometry.contains(&native))
            .collect();

        let tier = if !strict.is_empty() {
            MatchTier::Strict(strict)
        } else {
            let touching: Vec<&ZoneRecord> = candidates
                .iter()
                .copied()
                .filter(|r| r.geometry.intersects(&native))
                .collect();
            if touching.is_empty() {
                MatchTier::None
            } else {
                MatchTier::Approximate(touching)
            }
        };

        Ok(Lookup {
            point,
            projected: Coord { x, y },
            tier,
        })
    }
}
