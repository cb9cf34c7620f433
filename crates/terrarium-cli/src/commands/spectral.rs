//! Spectral composite command

use crate::cli::{CredentialArgs, SpectralArgs};
use crate::config_loader::connect;
use crate::input::parse_date;
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use terrarium_core::config::LayeredConfig;
use terrarium_core::models::SpectralIndex;
use terrarium_engine::{export_image, generate_spectral_image};

use super::region_geometry;

pub fn execute(
    args: SpectralArgs,
    output: &OutputWriter,
    config: &LayeredConfig,
    credentials: &CredentialArgs,
) -> Result<()> {
    // Reject unknown indices before opening a session
    let index: SpectralIndex = args.index.parse()?;
    let date = parse_date(&args.date)?;
    let geometry = region_geometry(&args.region)?;
    let session = connect(credentials, config)?;

    let image = generate_spectral_image(&session, date, &geometry, index.as_str())?;

    let (Some(bucket), Some(prefix)) = (&args.bucket, &args.prefix) else {
        // Without a destination, print the composite's expression graph
        return output.expression(&image.expr().encode());
    };

    let job = export_image(&session, &image, bucket, prefix)
        .with_context(|| format!("Failed to export {} composite", index))?;

    output.export_job(&job, &format!("gs://{}/{}", bucket, prefix))
}
