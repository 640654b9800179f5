//! Submit command implementation.
//!
//! Renders the backend's parent script around a job file and submits it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use xsub_sched::submit_job;

use super::common::{create_scheduler, load_config, load_parameters, print_json};

/// Execute the submit command.
pub async fn execute(
    scheduler: Option<&str>,
    job_file: &Path,
    parameters: Option<&str>,
    work_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(scheduler)?;
    if let Some(dir) = work_dir {
        config = config.with_work_dir(dir);
    }
    if let Some(dir) = log_dir {
        config = config.with_log_dir(dir);
    }
    let params = load_parameters(parameters)?;

    let backend = create_scheduler(config);
    info!("Submitting {} via {}", job_file.display(), backend.name());

    let job = submit_job(backend.as_ref(), job_file, &params)
        .await
        .with_context(|| format!("Failed to submit {}", job_file.display()))?;

    print_json(&job)
}
