//! PJM adapter for job submission and tracking.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{SchedError, SchedResult};
use crate::job::{DeleteResult, JobStatus, ListResult, StatusResult, SubmissionResult};
use crate::path;
use crate::pjm::{parser, templates, validate};
use crate::process::{CommandRunner, ShellCommand, quote, quote_path};
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerType};
use crate::schema::{ParameterMap, Schema};

/// Job-id token PJM substitutes into output file names.
const JOB_ID_TOKEN: &str = "%j";

/// Adapter for the Fujitsu PJM batch system.
pub struct PjmAdapter {
    config: SchedulerConfig,
    schema: Schema,
    runner: Arc<dyn CommandRunner>,
}

impl PjmAdapter {
    /// Create a new PJM adapter running commands through `runner`.
    pub fn new(config: SchedulerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            schema: templates::schema(),
            runner,
        }
    }

    /// Scheduler-side stdout, stderr and statistics file patterns.
    pub fn log_paths(&self) -> SchedResult<(PathBuf, PathBuf, PathBuf)> {
        let log_dir = path::expand(&self.config.log_dir)?;
        Ok((
            log_dir.join(format!("{JOB_ID_TOKEN}.o.txt")),
            log_dir.join(format!("{JOB_ID_TOKEN}.e.txt")),
            log_dir.join(format!("{JOB_ID_TOKEN}.i.txt")),
        ))
    }

    /// Build the `pjsub` command for an already rendered script.
    fn pjsub_command(&self, script_path: &Path) -> SchedResult<ShellCommand> {
        let work_dir = path::expand(&self.config.work_dir)?;
        let script_path = path::expand(script_path)?;
        let (stdout_path, stderr_path, stat_path) = self.log_paths()?;

        let line = format!(
            "pjsub {} -o {} -e {} --spath {} < /dev/null",
            quote_path(&script_path)?,
            quote_path(&stdout_path)?,
            quote_path(&stderr_path)?,
            quote_path(&stat_path)?,
        );
        Ok(ShellCommand::new(line).in_dir(work_dir))
    }
}

#[async_trait]
impl Scheduler for PjmAdapter {
    fn name(&self) -> &'static str {
        SchedulerType::Pjm.name()
    }

    fn template(&self) -> &'static str {
        templates::TEMPLATE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn validate(&self, params: &ParameterMap) -> SchedResult<()> {
        validate::validate(params)
    }

    async fn submit(&self, script_path: &Path) -> SchedResult<SubmissionResult> {
        fs::create_dir_all(&self.config.work_dir).await?;
        fs::create_dir_all(&self.config.log_dir).await?;

        let command = self.pjsub_command(script_path)?;
        info!("cmd: {}", command);
        let output = self.runner.run(&command).await?;

        if !output.success() {
            return Err(SchedError::CommandFailed {
                command: command.line,
                exit_code: output.exit_code,
                output: output.combined_lines(),
            });
        }

        // pjsub reports rc=0 for staging errors too; only the text tells.
        let job_id = parser::parse_pjsub_output(&output.stdout).map_err(|_| {
            SchedError::UnsupportedOutputFormat {
                command: command.line.clone(),
                output: output.combined_lines(),
            }
        })?;
        info!("job_id: {}", job_id);

        Ok(SubmissionResult {
            job_id,
            raw_output: output.combined_lines(),
        })
    }

    async fn status(&self, job_id: &str) -> SchedResult<StatusResult> {
        let command = ShellCommand::new(format!("pjstat {}", quote(job_id)?));
        let output = self.runner.run(&command).await?;
        let raw_output = output.stdout_lines();

        // A job that aged out of pjstat's window is indistinguishable from a finished one.
        if !output.success() {
            warn!(
                "pjstat {} exited with rc={}; treating job as finished",
                job_id, output.exit_code
            );
            return Ok(StatusResult {
                status: JobStatus::Finished,
                raw_output,
            });
        }

        let state = parser::parse_pjstat_output(&output.stdout).map_err(|_| {
            SchedError::UnsupportedOutputFormat {
                command: command.line.clone(),
                output: output.combined_lines(),
            }
        })?;
        if let parser::PjmState::Unknown(code) = &state {
            warn!("Unknown PJM state '{}' for job {}; treating as finished", code, job_id);
        }

        Ok(StatusResult {
            status: state.job_status(),
            raw_output,
        })
    }

    async fn all_status(&self) -> SchedResult<ListResult> {
        let output = self.runner.run(&ShellCommand::new("pjstat")).await?;
        Ok(ListResult {
            raw_output: output.stdout_lines(),
        })
    }

    async fn delete(&self, job_id: &str) -> SchedResult<DeleteResult> {
        let command = ShellCommand::new(format!("pjdel {}", quote(job_id)?));
        let output = self.runner.run(&command).await?;

        let raw_output = if output.success() {
            output.stdout_lines()
        } else {
            warn!("pjdel {} exited with rc={}", job_id, output.exit_code);
            vec![format!("pjdel failed: rc={}", output.exit_code)]
        };

        Ok(DeleteResult { raw_output })
    }
}
