//! Identifiers and states for remote imagery products and export jobs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TerrariumError};

/// Spectral products the spectral processor can derive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpectralIndex {
    /// True color composite of the TCI bands
    #[serde(rename = "TCI")]
    TrueColor,
    /// Normalized Difference Vegetation Index
    #[serde(rename = "NDVI")]
    Ndvi,
}

impl SpectralIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralIndex::TrueColor => "TCI",
            SpectralIndex::Ndvi => "NDVI",
        }
    }
}

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpectralIndex {
    type Err = TerrariumError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "TCI" => Ok(SpectralIndex::TrueColor),
            "NDVI" => Ok(SpectralIndex::Ndvi),
            other => Err(TerrariumError::UnsupportedIndex { index: other.to_string() }),
        }
    }
}

/// A submitted export job, addressed as `projects/{project}/operations/{task}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportJob {
    pub project_id: String,
    pub task_id: String,
}

impl ExportJob {
    pub fn new(project_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self { project_id: project_id.into(), task_id: task_id.into() }
    }

    /// Full operation name of the job
    pub fn operation_name(&self) -> String {
        format!("projects/{}/operations/{}", self.project_id, self.task_id)
    }

    /// Parse an operation name back into its project and task ids
    pub fn from_operation_name(name: &str) -> Result<Self> {
        let parts: Vec<&str> = name.split('/').collect();
        match parts.as_slice() {
            ["projects", project, "operations", task] if !project.is_empty() && !task.is_empty() => {
                Ok(Self::new(*project, *task))
            }
            _ => Err(TerrariumError::InvalidArgument {
                operation: "parse operation name".to_string(),
                reason: format!(
                    "'{}' is not of the form projects/{{project}}/operations/{{task}}",
                    name
                ),
            }),
        }
    }
}

/// Reference to an export job for status polling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobRef {
    /// Full operation name
    Operation(String),
    /// Task id and project id, combined into an operation name
    Task { task_id: String, project_id: String },
}

impl JobRef {
    /// Resolve the operation name, failing when an id is blank
    pub fn operation_name(&self) -> Result<String> {
        match self {
            JobRef::Operation(name) if !name.trim().is_empty() => Ok(name.clone()),
            JobRef::Task { task_id, project_id }
                if !task_id.trim().is_empty() && !project_id.trim().is_empty() =>
            {
                Ok(ExportJob::new(project_id.as_str(), task_id.as_str()).operation_name())
            }
            _ => Err(TerrariumError::InvalidArgument {
                operation: "check task status".to_string(),
                reason: "task ID and project ID must be specified if operation ID is not"
                    .to_string(),
            }),
        }
    }
}

impl From<&ExportJob> for JobRef {
    fn from(job: &ExportJob) -> Self {
        JobRef::Operation(job.operation_name())
    }
}

/// Remote-tracked state of an export job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    Pending,
    Running,
    Cancelling,
    Succeeded,
    Cancelled,
    Failed,
    Unknown,
}

impl JobState {
    /// Parse the platform's state string
    pub fn parse(state: &str) -> Self {
        match state {
            "PENDING" => JobState::Pending,
            "RUNNING" => JobState::Running,
            "CANCELLING" => JobState::Cancelling,
            "SUCCEEDED" => JobState::Succeeded,
            "CANCELLED" => JobState::Cancelled,
            "FAILED" => JobState::Failed,
            _ => JobState::Unknown,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Succeeded | JobState::Cancelled | JobState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_index_parsing() {
        assert_eq!("TCI".parse::<SpectralIndex>().unwrap(), SpectralIndex::TrueColor);
        assert_eq!("NDVI".parse::<SpectralIndex>().unwrap(), SpectralIndex::Ndvi);
        assert!(matches!(
            "EVI".parse::<SpectralIndex>(),
            Err(TerrariumError::UnsupportedIndex { .. })
        ));
        assert!("ndvi".parse::<SpectralIndex>().is_err());
    }

    #[test]
    fn test_operation_name_roundtrip() {
        let job = ExportJob::new("geosentry", "ABCD1234");
        let name = job.operation_name();
        assert_eq!(name, "projects/geosentry/operations/ABCD1234");
        assert_eq!(ExportJob::from_operation_name(&name).unwrap(), job);
        assert!(ExportJob::from_operation_name("operations/ABCD1234").is_err());
    }

    #[test]
    fn test_job_ref_requires_ids() {
        let task = JobRef::Task { task_id: "T1".into(), project_id: "p".into() };
        assert_eq!(task.operation_name().unwrap(), "projects/p/operations/T1");

        let missing = JobRef::Task { task_id: "T1".into(), project_id: String::new() };
        assert!(missing.operation_name().is_err());
        assert!(JobRef::Operation(" ".into()).operation_name().is_err());
    }

    #[test]
    fn test_job_state() {
        assert_eq!(JobState::parse("SUCCEEDED"), JobState::Succeeded);
        assert!(JobState::parse("FAILED").is_terminal());
        assert!(!JobState::parse("RUNNING").is_terminal());
        assert_eq!(JobState::parse("weird"), JobState::Unknown);
    }
}
