//! Command implementations

mod acquire;
mod export;
mod locate;
mod measure;
mod reshape;
mod spectral;

use crate::cli::{Cli, Commands};
use crate::config_loader::load_config;
use crate::input::read_region;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use geo::Polygon;
use terrarium_core::config::CliConfigOverrides;
use terrarium_core::models::Geometry;
use terrarium_geo::{parse_geometry, GeometryExt};

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    let (coverage_tolerance, point_buffer_km) = match &cli.command {
        Commands::Cover(args) => (args.tolerance, None),
        Commands::Reshape(args) => (None, args.buffer_km),
        _ => (None, None),
    };
    let overrides = CliConfigOverrides {
        project_id: cli.project.clone(),
        collection: cli.collection.clone(),
        coverage_tolerance,
        point_buffer_km,
    };
    let config = load_config(cli.config.as_deref(), overrides)?;
    let credentials = &cli.credentials;

    match cli.command {
        Commands::Area(args) => measure::area(args, &output),
        Commands::Centroid(args) => measure::centroid(args, &output),
        Commands::Reshape(args) => reshape::execute(args, &output, &config),
        Commands::Locate(args) => locate::execute(args, &output, &config),
        Commands::Latest(args) => acquire::latest(args, &output, &config, credentials),
        Commands::Cover(args) => acquire::cover(args, &output, &config, credentials),
        Commands::Spectral(args) => spectral::execute(args, &output, &config, credentials),
        Commands::Export(args) => export::export(args, &output, &config, credentials),
        Commands::Status(args) => export::status(args, &output, &config, credentials),
    }
}

/// Parse a region argument into a validated polygon geometry
fn region_geometry(region: &str) -> Result<Geometry> {
    let document = read_region(region)?;
    parse_geometry(&document).context("Failed to parse region")
}

/// Parse a region argument into a `geo` polygon
fn region_polygon(region: &str) -> Result<Polygon> {
    let geometry = region_geometry(region)?;
    match geometry.to_geo() {
        geo::Geometry::Polygon(polygon) => Ok(polygon),
        _ => anyhow::bail!("Region must be a polygon, got {}", geometry.geometry_type()),
    }
}
