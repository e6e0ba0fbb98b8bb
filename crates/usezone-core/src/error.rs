// crates/usezone-core/src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ZoneError>;

#[derive(Debug, Error)]
pub enum ZoneError {
    /// The dataset, or one of its mandatory sidecar files, is missing.
    #[error("dataset not found: {0}")]
    DatasetNotFound(String),

    /// The dataset exists but could not be read into polygon records.
    #[error("failed to parse dataset {path}: {message}")]
    DatasetParse { path: PathBuf, message: String },

    /// The dataset carries no usable coordinate reference system.
    #[error("unknown coordinate reference system: {0}")]
    UnknownCrs(String),

    /// Transforming coordinates between WGS84 and the dataset CRS failed.
    #[error("projection failed: {0}")]
    Projection(String),

    #[error("geocoding request timed out")]
    GeocodeTimeout,

    #[error("geocoding connection failed: {0}")]
    GeocodeConnection(String),

    /// The service answered but knew no match for the address.
    #[error("no coordinates found for address: {0}")]
    GeocodeNoResult(String),

    /// The service answered with a body we could not interpret.
    #[error("malformed geocoding response: {0}")]
    GeocodeMalformed(String),

    #[error("address must not be empty")]
    EmptyAddress,

    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// Map document construction failed; callers fall back to a
    /// point-only map.
    #[error("map rendering failed: {0}")]
    MapRender(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
