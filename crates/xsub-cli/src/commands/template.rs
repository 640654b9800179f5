//! Template command implementation.
//!
//! Prints the backend's script template and declared parameters as JSON.

use anyhow::Result;
use serde::Serialize;

use xsub_sched::{ParameterSpec, Scheduler};

use super::common::{create_scheduler, load_config, print_json};

#[derive(Debug, Serialize)]
struct TemplateInfo<'a> {
    scheduler: &'a str,
    template: Vec<&'a str>,
    parameters: Vec<&'a ParameterSpec>,
}

fn describe(backend: &dyn Scheduler) -> TemplateInfo<'_> {
    TemplateInfo {
        scheduler: backend.name(),
        template: backend.template().lines().collect(),
        parameters: backend.schema().iter().collect(),
    }
}

/// Execute the template command.
pub fn execute(scheduler: Option<&str>) -> Result<()> {
    let backend = create_scheduler(load_config(scheduler)?);
    print_json(&describe(backend.as_ref()))
}
