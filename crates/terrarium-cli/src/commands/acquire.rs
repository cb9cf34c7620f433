//! Latest-date and covering-image commands

use crate::cli::{CoverArgs, CredentialArgs, RegionArgs};
use crate::config_loader::connect;
use crate::input::parse_date;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use terrarium_core::config::LayeredConfig;
use terrarium_engine::{find_covering_image, find_latest_date, image_identifier};

use super::region_geometry;

pub fn latest(
    args: RegionArgs,
    output: &OutputWriter,
    config: &LayeredConfig,
    credentials: &CredentialArgs,
) -> Result<()> {
    let geometry = region_geometry(&args.region)?;
    let session = connect(credentials, config)?;

    let date = find_latest_date(&session, &geometry).context("Failed to find latest acquisition")?;

    output.latest_date(date)
}

pub fn cover(
    args: CoverArgs,
    output: &OutputWriter,
    config: &LayeredConfig,
    credentials: &CredentialArgs,
) -> Result<()> {
    let date = parse_date(&args.date)?;
    let geometry = region_geometry(&args.region)?;
    let session = connect(credentials, config)?;

    let image = find_covering_image(&session, date, &geometry)
        .context("Failed to search for a covering image")?;
    let identifier = image.map(|image| image_identifier(&session, &image)).transpose()?;

    output.covering_image(date, identifier.as_deref())
}
