//! Export and task status commands

use crate::cli::{CredentialArgs, ExportArgs, StatusArgs};
use crate::config_loader::connect;
use crate::input::parse_date;
use crate::output::OutputWriter;
use anyhow::{bail, Context, Result};
use terrarium_core::config::LayeredConfig;
use terrarium_core::models::JobRef;
use terrarium_engine::{export_image, find_covering_image, job_status};

use super::region_geometry;

pub fn export(
    args: ExportArgs,
    output: &OutputWriter,
    config: &LayeredConfig,
    credentials: &CredentialArgs,
) -> Result<()> {
    let date = parse_date(&args.date)?;
    let geometry = region_geometry(&args.region)?;
    let session = connect(credentials, config)?;

    let Some(image) = find_covering_image(&session, date, &geometry)
        .context("Failed to search for a covering image")?
    else {
        bail!("No image fully covers the region within a day of {}", date);
    };

    let job = export_image(&session, &image, &args.bucket, &args.prefix)?;

    output.export_job(&job, &format!("gs://{}/{}", args.bucket, args.prefix))
}

pub fn status(
    args: StatusArgs,
    output: &OutputWriter,
    config: &LayeredConfig,
    credentials: &CredentialArgs,
) -> Result<()> {
    let present = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
    let (operation, task) = (present(args.operation), present(args.task));
    if operation.is_none() && task.is_none() {
        bail!("Either --operation or --task must be given");
    }

    let session = connect(credentials, config)?;
    let job = match (operation, task) {
        (Some(operation), _) => JobRef::Operation(operation),
        (None, Some(task_id)) => {
            JobRef::Task { task_id, project_id: session.project_id().to_string() }
        }
        (None, None) => bail!("Either --operation or --task must be given"),
    };

    let status = job_status(&session, &job).context("Failed to check task status")?;

    output.job_status(&status)
}
