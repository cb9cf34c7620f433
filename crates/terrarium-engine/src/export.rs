//! Cloud-storage exports of derived images and export job polling

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use terrarium_core::error::{Result, TerrariumError};
use terrarium_core::models::{ExportJob, JobRef, JobState};

use crate::expression::Expr;
use crate::image::{ImageHandle, Reprojection};
use crate::session::Session;

/// Description attached to every export task
pub const EXPORT_DESCRIPTION: &str = "export";

/// Export resolution in metres per pixel
pub const EXPORT_SCALE: f64 = 1.0;

/// A GeoTIFF export of an image into a cloud-storage bucket
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub expression: Expr,
    pub description: String,
    pub bucket: String,
    pub filename_prefix: String,
    pub max_pixels: f64,
    pub skip_empty_tiles: bool,
}

impl ExportRequest {
    /// Request body for the platform's image export endpoint
    pub fn to_body(&self) -> Value {
        json!({
            "expression": self.expression.encode(),
            "description": self.description,
            "fileExportOptions": {
                "fileFormat": "GEO_TIFF",
                "cloudStorageDestination": {
                    "bucket": self.bucket,
                    "filenamePrefix": self.filename_prefix,
                },
                "geoTiffOptions": { "skipEmptyFiles": self.skip_empty_tiles },
            },
            // int64 fields travel as strings
            "maxPixels": format!("{:.0}", self.max_pixels),
        })
    }
}

/// Submit a GeoTIFF export of `image` to `gs://{bucket}/{name_prefix}`.
///
/// The image is exported at 1 m in its native projection over its own
/// footprint. The job is returned as soon as it is accepted.
pub fn export_image(
    session: &Session,
    image: &ImageHandle,
    bucket: &str,
    name_prefix: &str,
) -> Result<ExportJob> {
    for (name, value) in [("bucket", bucket), ("name prefix", name_prefix)] {
        if value.trim().is_empty() {
            return Err(TerrariumError::InvalidArgument {
                operation: "create image export task".to_string(),
                reason: format!("{} must not be empty", name),
            });
        }
    }

    let expression = image
        .reproject(&Reprojection::Native, Some(EXPORT_SCALE))
        .clip(image.geometry())
        .into_expr();

    let request = ExportRequest {
        expression,
        description: EXPORT_DESCRIPTION.to_string(),
        bucket: bucket.to_string(),
        filename_prefix: name_prefix.to_string(),
        max_pixels: session.settings().max_pixels,
        skip_empty_tiles: true,
    };

    let operation = session.platform().start_export(&request)?;
    let name = operation.get("name").and_then(Value::as_str).ok_or_else(|| {
        TerrariumError::remote("create image export task", "response has no operation name")
    })?;

    let job = ExportJob::from_operation_name(name)?;
    info!(operation = %name, bucket, prefix = name_prefix, "Submitted image export");
    Ok(job)
}

/// Status payload of an export job, as reported by the platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JobStatus(Value);

impl JobStatus {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn raw(&self) -> &Value {
        &self.0
    }

    pub fn into_raw(self) -> Value {
        self.0
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    /// Typed state, read from the operation metadata
    pub fn state(&self) -> JobState {
        let state = self
            .0
            .pointer("/metadata/state")
            .and_then(Value::as_str)
            .unwrap_or_default();

        match JobState::parse(state) {
            JobState::Unknown if self.error_message().is_some() => JobState::Failed,
            state => state,
        }
    }

    pub fn is_done(&self) -> bool {
        self.0.get("done").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0.pointer("/error/message").and_then(Value::as_str)
    }
}

/// Poll the current status of an export job
pub fn job_status(session: &Session, job: &JobRef) -> Result<JobStatus> {
    let name = job.operation_name()?;
    debug!(operation = %name, "Checking task status");
    session.platform().get_operation(&name).map(JobStatus::new)
}
