//! Error handling for the scheduler adapters.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for scheduler operations.
pub type SchedResult<T> = Result<T, SchedError>;

/// Errors that can occur while preparing, submitting or querying a job.
#[derive(Error, Debug)]
pub enum SchedError {
    /// A parameter is missing, malformed, or inconsistent with another one.
    ///
    /// Always raised before any external command runs.
    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// A template referenced a value that is not in the render context.
    #[error("Template rendering failed: {0}")]
    Render(String),

    /// An external command exited with a nonzero code.
    #[error("Command `{command}` failed (rc={exit_code}): {}", .output.join("\n"))]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: Vec<String>,
    },

    /// An external command looked successful but its output could not be parsed.
    #[error("Unsupported output format from `{command}`: {}", .output.join("\n"))]
    UnsupportedOutputFormat {
        command: String,
        output: Vec<String>,
    },

    /// The shell used to run a command could not be started.
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The user's job file does not exist.
    #[error("Job file not found: {}", .0.display())]
    JobFileNotFound(PathBuf),

    /// No backend is registered under the given name.
    #[error("Unknown scheduler: '{0}'. Available: none, k")]
    UnknownScheduler(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchedError {
    /// The literal tool output attached to this error, if any.
    pub fn raw_output(&self) -> Option<&[String]> {
        match self {
            SchedError::CommandFailed { output, .. }
            | SchedError::UnsupportedOutputFormat { output, .. } => Some(output),
            _ => None,
        }
    }
}
