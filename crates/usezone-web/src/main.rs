//! usezone-web — form frontend for usezone-core
//!
//! Serves a single page with two mutually exclusive input modes (free-text
//! address, or explicit latitude/longitude) and a JSON API behind it. The
//! dataset is loaded once at startup and shared across requests; the
//! geocoder keeps its own per-address cache. A dataset that fails to load
//! aborts startup with a visible diagnostic; every later failure is
//! reported inline to the page and never takes the server down.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{error, get, middleware, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use serde::{Deserialize, Serialize};

use usezone_core::{
    attribute_card, default_dataset_path, map_document, AttributeCard, Geocoder, GsiClient,
    Lookup, QueryPoint, ZoneDataset, ZoneError,
};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Debug, Parser)]
#[command(
    name = "usezone-web",
    version,
    about = "Web frontend for use-zone lookup"
)]
struct Args {
    /// Path to the dataset .shp (default: shapefiles/用途地域.shp)
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Socket address to bind
    #[arg(short = 'b', long = "bind", default_value = "127.0.0.1:8080")]
    bind: String,
}

struct AppState {
    dataset: Arc<ZoneDataset>,
    geocoder: Geocoder<GsiClient>,
}

#[derive(Debug, Deserialize)]
struct PointQuery {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct AddressQuery {
    q: String,
}

#[derive(Serialize)]
struct LookupResponse {
    tier: &'static str,
    /// Query point, WGS84 [lat, lon].
    query: [f64; 2],
    /// Coordinates actually tested, dataset CRS [x, y].
    projected: [f64; 2],
    epsg: Option<u16>,
    zones: Vec<AttributeCard>,
    map: geojson::GeoJson,
}

#[derive(Serialize)]
struct GeocodeInfo {
    lat: f64,
    lon: f64,
    title: String,
    message: String,
}

#[derive(Serialize)]
struct AddressResponse {
    geocode: GeocodeInfo,
    result: LookupResponse,
}

/// JSON error body with a status that matches the failure kind.
#[derive(Debug)]
struct ApiError(ZoneError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ZoneError> for ApiError {
    fn from(e: ZoneError) -> Self {
        Self(e)
    }
}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            ZoneError::LatitudeOutOfRange(_)
            | ZoneError::LongitudeOutOfRange(_)
            | ZoneError::EmptyAddress => StatusCode::BAD_REQUEST,
            ZoneError::GeocodeNoResult(_) => StatusCode::NOT_FOUND,
            ZoneError::GeocodeTimeout => StatusCode::GATEWAY_TIMEOUT,
            ZoneError::GeocodeConnection(_) | ZoneError::GeocodeMalformed(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.0.to_string() }))
    }
}

fn lookup_response(dataset: &ZoneDataset, lookup: &Lookup<'_>) -> LookupResponse {
    LookupResponse {
        tier: lookup.tier.label(),
        query: [lookup.point.lat(), lookup.point.lon()],
        projected: [lookup.projected.x, lookup.projected.y],
        epsg: dataset.stats().epsg,
        zones: lookup
            .tier
            .records()
            .iter()
            .map(|record| attribute_card(record))
            .collect(),
        map: map_document(lookup, dataset.crs()),
    }
}

fn run_lookup(dataset: &ZoneDataset, point: QueryPoint) -> Result<LookupResponse, ApiError> {
    let lookup = dataset.locate(point)?;
    Ok(lookup_response(dataset, &lookup))
}

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(INDEX_HTML)
}

#[get("/api/info")]
async fn info(data: web::Data<AppState>) -> impl Responder {
    web::Json(data.dataset.stats())
}

#[get("/api/point")]
async fn point_lookup(
    query: web::Query<PointQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let point = QueryPoint::new(query.lat, query.lon)?;
    let response = run_lookup(&data.dataset, point)?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/address")]
async fn address_lookup(
    query: web::Query<AddressQuery>,
    data: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    // The geocoder blocks on the network; keep it off the async workers.
    let blocking_data = data.clone();
    let address = query.q.clone();
    let hit = web::block(move || blocking_data.geocoder.resolve(&address))
        .await
        .map_err(|e| ApiError(ZoneError::GeocodeConnection(e.to_string())))??;

    let point = QueryPoint::new(hit.lat, hit.lon)?;
    let result = run_lookup(&data.dataset, point)?;
    Ok(HttpResponse::Ok().json(AddressResponse {
        geocode: GeocodeInfo {
            lat: hit.lat,
            lon: hit.lon,
            message: format!("Geocoding succeeded: {}", hit.title),
            title: hit.title,
        },
        result,
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    let args = Args::parse();

    let input = args.input.unwrap_or_else(default_dataset_path);
    // Fatal: without the dataset there is nothing to serve.
    let dataset = ZoneDataset::load(&input)
        .map_err(|e| anyhow::anyhow!("cannot start, dataset unavailable: {e}"))?;
    let stats = dataset.stats();
    log::info!(
        "serving {} zone records from {} on http://{}",
        stats.records,
        dataset.source().display(),
        args.bind
    );

    let state = web::Data::new(AppState {
        dataset,
        geocoder: Geocoder::new().map_err(|e| anyhow::anyhow!("geocoder setup failed: {e}"))?,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .service(index)
            .service(info)
            .service(point_lookup)
            .service(address_lookup)
    })
    .bind(&args.bind)?
    .run()
    .await?;

    Ok(())
}
