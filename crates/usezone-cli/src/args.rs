use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for usezone-cli
#[derive(Debug, Parser)]
#[command(
    name = "usezone",
    version,
    about = "CLI for looking up use-zone regulations at a geographic point"
)]
pub struct CliArgs {
    /// Path to the dataset .shp (default: shapefiles/用途地域.shp)
    #[arg(short = 'i', long = "input", global = true)]
    pub input: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a summary of the loaded dataset
    Stats,

    /// Geocode a free-text address, then look up its use zone
    Address {
        /// Address to search (e.g. 東京都千代田区九段北4-1-3)
        query: String,

        /// Write the result map as GeoJSON to this file
        #[arg(short = 'm', long = "map")]
        map: Option<PathBuf>,
    },

    /// Look up the use zone at explicit WGS84 coordinates
    Point {
        /// Latitude (e.g. 35.693593)
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude (e.g. 139.753012)
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Write the result map as GeoJSON to this file
        #[arg(short = 'm', long = "map")]
        map: Option<PathBuf>,
    },
}
