//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use xsub_sched::{
    ParameterMap, Scheduler, SchedulerConfig, SchedulerType, ShellRunner, build_scheduler,
    parameters_from_json,
};

/// Scheduler configuration from `XSUB_TYPE`, overridden by `--scheduler`.
pub fn load_config(scheduler: Option<&str>) -> Result<SchedulerConfig> {
    with_scheduler_flag(SchedulerConfig::from_env()?, scheduler)
}

/// Apply `--scheduler` over a loaded configuration.
fn with_scheduler_flag(
    config: SchedulerConfig,
    scheduler: Option<&str>,
) -> Result<SchedulerConfig> {
    match scheduler {
        Some(name) => Ok(config.with_scheduler(name.parse::<SchedulerType>()?)),
        None => Ok(config),
    }
}

/// Create the configured backend, running commands through the system shell.
pub fn create_scheduler(config: SchedulerConfig) -> Box<dyn Scheduler> {
    build_scheduler(config, Arc::new(ShellRunner::new()))
}

/// Parse `-p/--parameters`: an inline JSON object, or a JSON or YAML file.
pub fn load_parameters(arg: Option<&str>) -> Result<ParameterMap> {
    let Some(arg) = arg else {
        return Ok(ParameterMap::new());
    };

    let value: serde_json::Value = if arg.trim_start().starts_with('{') {
        serde_json::from_str(arg).context("Failed to parse inline parameters as JSON")?
    } else {
        let path = Path::new(arg);
        if !path.exists() {
            anyhow::bail!("Parameter file not found: {arg}");
        }
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read parameter file: {arg}"))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml_ng::from_str(&source)
                .with_context(|| format!("Failed to parse YAML parameters: {arg}"))?,
            _ => serde_json::from_str(&source)
                .with_context(|| format!("Failed to parse JSON parameters: {arg}"))?,
        }
    };

    Ok(parameters_from_json(value)?)
}

/// Print a result as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
