//! Reshape command

use crate::cli::ReshapeArgs;
use crate::input::read_region;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use terrarium_core::config::LayeredConfig;
use terrarium_core::models::Distance;
use terrarium_geo::{from_local_shape, reshape_to_square, to_local_shape};

pub fn execute(args: ReshapeArgs, output: &OutputWriter, config: &LayeredConfig) -> Result<()> {
    let document = read_region(&args.region)?;
    let shape = to_local_shape(&document).context("Failed to parse region")?;

    let buffer = Distance::kilometers(config.point_buffer_km.value);
    let square = reshape_to_square(&shape, buffer)?;
    let area = terrarium_geo::area(&square);

    let geojson: serde_json::Value =
        serde_json::from_str(&from_local_shape(&geo::Geometry::Polygon(square))?)?;

    output.region(&geojson, &area)
}
