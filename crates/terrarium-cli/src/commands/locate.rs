//! Reverse geocoding command

use crate::cli::LocateArgs;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use terrarium_core::config::LayeredConfig;
use terrarium_engine::GoogleGeocoder;
use terrarium_geo::{reverse_geocode, UNKNOWN_LOCATION};

pub fn execute(args: LocateArgs, output: &OutputWriter, config: &LayeredConfig) -> Result<()> {
    let geocoder = GoogleGeocoder::new(config.geocoding_api_key.value.clone())?;
    let location = reverse_geocode(&geocoder, args.longitude, args.latitude)
        .context("Failed to locate coordinate")?;

    let known = location != UNKNOWN_LOCATION;
    output.location(args.longitude, args.latitude, &location, known)
}
