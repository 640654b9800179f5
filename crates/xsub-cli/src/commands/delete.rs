//! Delete command implementation.

use anyhow::{Context, Result};

use super::common::{create_scheduler, load_config, print_json};

/// Execute the delete command.
pub async fn execute(scheduler: Option<&str>, job_id: &str) -> Result<()> {
    let backend = create_scheduler(load_config(scheduler)?);
    let result = backend
        .delete(job_id)
        .await
        .with_context(|| format!("Failed to delete {job_id}"))?;
    print_json(&result)
}
