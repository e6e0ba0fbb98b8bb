// crates/usezone-core/src/lib.rs

pub mod crs;
pub mod error;
pub mod format;
pub mod geocode;
pub mod loader;
pub mod locate;
pub mod map;
pub mod model;

// Re-exports
pub use crate::crs::DatasetCrs;
pub use crate::error::{Result, ZoneError};
pub use crate::format::{attribute_card, AttributeCard, CardRow};
pub use crate::geocode::{AddressSearch, GeocodeHit, Geocoder, GsiClient};
pub use crate::loader::{default_dataset_path, ZoneDataset};
pub use crate::locate::{Lookup, MatchTier, QueryPoint};
pub use crate::map::map_document;
pub use crate::model::{AttrValue, DatasetStats, ZoneAttributes, ZoneRecord};
