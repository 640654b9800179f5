//! Status command implementation.

use anyhow::{Context, Result};

use super::common::{create_scheduler, load_config, print_json};

/// Execute the status command.
pub async fn execute(scheduler: Option<&str>, job_id: Option<&str>, all: bool) -> Result<()> {
    let backend = create_scheduler(load_config(scheduler)?);

    if all {
        let jobs = backend.all_status().await.context("Failed to list jobs")?;
        return print_json(&jobs);
    }

    let job_id = job_id
        .ok_or_else(|| anyhow::anyhow!("Please provide a job ID or use --all to list all jobs"))?;

    let status = backend
        .status(job_id)
        .await
        .with_context(|| format!("Failed to get status of {job_id}"))?;
    print_json(&status)
}
