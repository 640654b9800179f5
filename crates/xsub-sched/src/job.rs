//! Normalized job results shared by every backend.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::schema::ParameterMap;

/// Portable job status.
///
/// Deliberately coarse: each backend collapses its native vocabulary into
/// these three values. `Finished` is terminal, and anything a backend does not
/// recognize maps to it so a job never looks stuck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted by the scheduler, not yet running.
    Queued,
    /// Staging or executing.
    Running,
    /// Exited, cancelled, failed, or no longer known to the scheduler.
    Finished,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of handing a script to a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Backend-assigned identifier; opaque to callers.
    pub job_id: String,
    pub raw_output: Vec<String>,
}

/// Result of a single status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    pub status: JobStatus,
    pub raw_output: Vec<String>,
}

/// Unparsed listing of every job the backend knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResult {
    pub raw_output: Vec<String>,
}

/// Output of a cancellation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub raw_output: Vec<String>,
}

/// Everything produced by the full submission pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedJob {
    pub job_id: String,
    pub raw_output: Vec<String>,
    /// The rendered script that was actually submitted.
    pub parent_script: PathBuf,
    /// Parameters after defaults were merged in.
    pub parameters: ParameterMap,
}

impl SubmittedJob {
    pub fn new(result: SubmissionResult, parent_script: PathBuf, parameters: ParameterMap) -> Self {
        Self {
            job_id: result.job_id,
            raw_output: result.raw_output,
            parent_script,
            parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_terminal() {
        assert!(JobStatus::Finished.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
    }

    #[test]
    fn test_status_result_json() {
        let result = StatusResult {
            status: JobStatus::Running,
            raw_output: vec!["line".to_string()],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "running");
        assert_eq!(json["raw_output"][0], "line");

        let back: StatusResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_job_status_display() {
        assert_eq!(JobStatus::Queued.to_string(), "queued");
        assert_eq!(JobStatus::Finished.to_string(), "finished");
    }
}
