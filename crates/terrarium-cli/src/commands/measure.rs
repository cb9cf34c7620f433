//! Area and centroid commands

use crate::cli::RegionArgs;
use crate::output::OutputWriter;
use anyhow::Result;

use super::region_polygon;

pub fn area(args: RegionArgs, output: &OutputWriter) -> Result<()> {
    let polygon = region_polygon(&args.region)?;
    output.area(&terrarium_geo::area(&polygon))
}

pub fn centroid(args: RegionArgs, output: &OutputWriter) -> Result<()> {
    let polygon = region_polygon(&args.region)?;
    output.centroid(&terrarium_geo::centroid(&polygon)?)
}
