// crates/usezone-core/src/geocode.rs

//! # Geocoder client
//!
//! Resolves a free-text address to WGS84 coordinates via the GSI address
//! search API. Successful hits are memoized per distinct address for the
//! process lifetime; repeating an identical address never re-triggers a
//! network call. Failures are not cached.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;

use crate::error::{Result, ZoneError};

/// GSI address search endpoint.
pub const GSI_SEARCH_URL: &str = "https://msearch.gsi.go.jp/address-search/AddressSearch";

/// Bound on the outbound request.
pub const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully resolved address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub lat: f64,
    pub lon: f64,
    /// Display title of the first match, as reported by the service.
    pub title: String,
}

/// Transport seam: anything that can turn an address into coordinates.
pub trait AddressSearch {
    fn search(&self, address: &str) -> Result<GeocodeHit>;
}

#[derive(Debug, Deserialize)]
struct SearchFeature {
    geometry: SearchGeometry,
    #[serde(default)]
    properties: SearchProperties,
}

#[derive(Debug, Deserialize)]
struct SearchGeometry {
    coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchProperties {
    title: Option<String>,
}

/// Decode a GSI response body. The payload is a JSON array of point
/// features with `[lon, lat]` coordinates.
pub fn parse_search_response(address: &str, body: &str) -> Result<GeocodeHit> {
    let features: Vec<SearchFeature> =
        serde_json::from_str(body).map_err(|e| ZoneError::GeocodeMalformed(e.to_string()))?;
    let first = features
        .into_iter()
        .next()
        .ok_or_else(|| ZoneError::GeocodeNoResult(address.to_string()))?;

    let coords = &first.geometry.coordinates;
    if coords.len() != 2 {
        return Err(ZoneError::GeocodeMalformed(format!(
            "expected [lon, lat], got {} coordinates",
            coords.len()
        )));
    }
    let (lon, lat) = (coords[0], coords[1]);
    let title = first
        .properties
        .title
        .unwrap_or_else(|| address.to_string());

    debug!("geocoded {address} -> lat={lat}, lon={lon}");
    Ok(GeocodeHit { lat, lon, title })
}

/// Blocking HTTP client for the GSI endpoint.
pub struct GsiClient {
    client: reqwest::blocking::Client,
}

impl GsiClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(GEOCODE_TIMEOUT)
            .build()
            .map_err(|e| ZoneError::GeocodeConnection(e.to_string()))?;
        Ok(Self { client })
    }
}

impl AddressSearch for GsiClient {
    fn search(&self, address: &str) -> Result<GeocodeHit> {
        info!("geocoding via GSI address search: {address}");
        let response = self
            .client
            .get(GSI_SEARCH_URL)
            .query(&[("q", address)])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ZoneError::GeocodeTimeout
                } else {
                    ZoneError::GeocodeConnection(e.to_string())
                }
            })?;
        let response = response
            .error_for_status()
            .map_err(|e| ZoneError::GeocodeConnection(e.to_string()))?;
        let body = response
            .text()
            .map_err(|e| ZoneError::GeocodeConnection(e.to_string()))?;
        parse_search_response(address, &body)
    }
}

/// Caching front over a transport.
pub struct Geocoder<S = GsiClient> {
    backend: S,
    cache: Mutex<HashMap<String, GeocodeHit>>,
}

impl Geocoder<GsiClient> {
    pub fn new() -> Result<Self> {
        Ok(Self::with_backend(GsiClient::new()?))
    }
}

impl<S: AddressSearch> Geocoder<S> {
    pub fn with_backend(backend: S) -> Self {
        Self {
            backend,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an address, consulting the per-process cache first.
    pub fn resolve(&self, address: &str) -> Result<GeocodeHit> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ZoneError::EmptyAddress);
        }

        if let Some(hit) = self
            .cache
            .lock()
            .expect("geocode cache poisoned")
            .get(address)
        {
            debug!("geocode cache hit: {address}");
            return Ok(hit.clone());
        }

        let hit = self.backend.search(address)?;
        self.cache
            .lock()
            .expect("geocode cache poisoned")
            .insert(address.to_string(), hit.clone());
        Ok(hit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const SAMPLE_BODY: &str = r#"[
        {
            "geometry": {"coordinates": [139.7530125, 35.69359375], "type": "Point"},
            "type": "Feature",
            "properties": {"addressCode": "", "title": "東京都千代田区九段北四丁目1-3"}
        }
    ]"#;

    #[test]
    fn parses_the_first_feature() {
        let hit = parse_search_response("九段北4-1-3", SAMPLE_BODY).unwrap();
        assert!((hit.lat - 35.6936).abs() < 1e-3);
        assert!((hit.lon - 139.7530).abs() < 1e-3);
        assert_eq!(hit.title, "東京都千代田区九段北四丁目1-3");
    }

    #[test]
    fn empty_result_set_is_no_result() {
        assert!(matches!(
            parse_search_response("nowhere", "[]"),
            Err(ZoneError::GeocodeNoResult(_))
        ));
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            parse_search_response("x", "<html>busy</html>"),
            Err(ZoneError::GeocodeMalformed(_))
        ));
    }

    #[test]
    fn short_coordinate_arrays_are_malformed() {
        let body = r#"[{"geometry": {"coordinates": [139.7]}, "properties": {}}]"#;
        assert!(matches!(
            parse_search_response("x", body),
            Err(ZoneError::GeocodeMalformed(_))
        ));
    }

    #[test]
    fn missing_title_falls_back_to_the_query() {
        let body = r#"[{"geometry": {"coordinates": [139.7, 35.6]}, "properties": {}}]"#;
        let hit = parse_search_response("千代田区", body).unwrap();
        assert_eq!(hit.title, "千代田区");
    }

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    impl AddressSearch for Counting {
        fn search(&self, _address: &str) -> Result<GeocodeHit> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeocodeHit {
                lat: 35.6936,
                lon: 139.7530,
                title: "resolved".into(),
            })
        }
    }

    #[test]
    fn identical_addresses_hit_the_network_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let geocoder = Geocoder::with_backend(Counting {
            calls: Arc::clone(&calls),
        });

        let first = geocoder.resolve("東京都千代田区九段北4-1-3").unwrap();
        let second = geocoder.resolve("東京都千代田区九段北4-1-3").unwrap();
        // Leading/trailing whitespace keys the same cache slot.
        let third = geocoder.resolve("  東京都千代田区九段北4-1-3 ").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn distinct_addresses_each_go_out_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let geocoder = Geocoder::with_backend(Counting {
            calls: Arc::clone(&calls),
        });

        geocoder.resolve("住所A").unwrap();
        geocoder.resolve("住所B").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn empty_address_is_rejected_before_the_backend() {
        let calls = Arc::new(AtomicUsize::new(0));
        let geocoder = Geocoder::with_backend(Counting {
            calls: Arc::clone(&calls),
        });

        assert!(matches!(
            geocoder.resolve("   "),
            Err(ZoneError::EmptyAddress)
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
