use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Terrarium - Sentinel-2 acquisition and export toolkit
#[derive(Parser, Debug)]
#[command(name = "terrarium")]
#[command(about = "Acquire, derive and export Sentinel-2 imagery over regions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./terrarium.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Cloud project to bill Earth Engine requests to
    #[arg(long, global = true)]
    pub project: Option<String>,

    /// Image collection to search
    #[arg(long, global = true)]
    pub collection: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the Earth Engine service account comes from
#[derive(Args, Debug, Default)]
pub struct CredentialArgs {
    /// Service-account key file
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "secret")]
    pub key_file: Option<PathBuf>,

    /// Secret Manager secret holding the key
    #[arg(long, global = true, value_name = "SECRET_ID")]
    pub secret: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Geodesic area of a polygon region
    Area(RegionArgs),

    /// Centroid of a polygon region
    Centroid(RegionArgs),

    /// Reshape a point, line-string or polygon into a square region
    Reshape(ReshapeArgs),

    /// Reverse geocode a coordinate into its administrative area
    Locate(LocateArgs),

    /// Date of the latest acquisition over a region in the past week
    Latest(RegionArgs),

    /// Find an image fully covering a region near a date
    Cover(CoverArgs),

    /// Build a spectral composite over a region and optionally export it
    Spectral(SpectralArgs),

    /// Export the covering image of a region near a date
    Export(ExportArgs),

    /// Show the status of an export task
    Status(StatusArgs),
}

#[derive(Args, Debug)]
pub struct RegionArgs {
    /// GeoJSON document or path to a GeoJSON file
    pub region: String,
}

#[derive(Args, Debug)]
pub struct ReshapeArgs {
    /// GeoJSON document or path to a GeoJSON file
    pub region: String,

    /// Half-side in kilometres of the square built around a point
    #[arg(long, value_name = "KM")]
    pub buffer_km: Option<f64>,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Longitude in degrees
    #[arg(allow_negative_numbers = true)]
    pub longitude: f64,

    /// Latitude in degrees
    #[arg(allow_negative_numbers = true)]
    pub latitude: f64,
}

#[derive(Args, Debug)]
pub struct CoverArgs {
    /// GeoJSON document or path to a GeoJSON file
    pub region: String,

    /// Target acquisition date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    pub date: String,

    /// Accept coverage scores within this many percent of full coverage
    #[arg(long, value_name = "PERCENT")]
    pub tolerance: Option<f64>,
}

#[derive(Args, Debug)]
pub struct SpectralArgs {
    /// GeoJSON document or path to a GeoJSON file
    pub region: String,

    /// Acquisition date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    pub date: String,

    /// Spectral index (TCI or NDVI)
    #[arg(long, default_value = "TCI")]
    pub index: String,

    /// Export the composite to this bucket
    #[arg(long, requires = "prefix")]
    pub bucket: Option<String>,

    /// File name prefix within the bucket
    #[arg(long)]
    pub prefix: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// GeoJSON document or path to a GeoJSON file
    pub region: String,

    /// Target acquisition date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
    #[arg(long)]
    pub date: String,

    /// Destination bucket
    #[arg(long)]
    pub bucket: String,

    /// File name prefix within the bucket
    #[arg(long)]
    pub prefix: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Full operation name (projects/{project}/operations/{task})
    #[arg(long, conflicts_with = "task")]
    pub operation: Option<String>,

    /// Task id, combined with the session project
    #[arg(long)]
    pub task: Option<String>,
}
