//! Local adapter: fork the job in the background and track it by pid.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use crate::error::{SchedError, SchedResult};
use crate::job::{DeleteResult, JobStatus, ListResult, StatusResult, SubmissionResult};
use crate::none::parser;
use crate::path;
use crate::process::{CommandRunner, ShellCommand, quote_path};
use crate::scheduler::{Scheduler, SchedulerConfig, SchedulerType};
use crate::schema::Schema;

/// The rendered script just sources the user's job file.
pub const TEMPLATE: &str = ". {{ job_file }}\n";

/// Runs jobs as detached processes on the current host.
pub struct LocalAdapter {
    config: SchedulerConfig,
    schema: Schema,
    runner: Arc<dyn CommandRunner>,
}

impl LocalAdapter {
    pub fn new(config: SchedulerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config,
            schema: Schema::new(),
            runner,
        }
    }
}

fn pid_arg(job_id: &str) -> SchedResult<u32> {
    parser::parse_pid(job_id)
        .ok_or_else(|| SchedError::Validation(format!("job id '{job_id}' is not a process id")))
}

#[async_trait]
impl Scheduler for LocalAdapter {
    fn name(&self) -> &'static str {
        SchedulerType::Local.name()
    }

    fn template(&self) -> &'static str {
        TEMPLATE
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    async fn submit(&self, script_path: &Path) -> SchedResult<SubmissionResult> {
        let script_path = path::expand(script_path)?;
        fs::create_dir_all(&self.config.work_dir).await?;

        // The launcher returns as soon as the job is forked; its rc says
        // nothing about how the job itself ends.
        let command = ShellCommand::new(format!(
            "nohup bash {} > /dev/null 2>&1 < /dev/null & echo $!",
            quote_path(&script_path)?
        ))
        .in_dir(&self.config.work_dir);
        info!("{} is invoked", command);
        let output = self.runner.run(&command).await?;

        if !output.success() {
            return Err(SchedError::CommandFailed {
                command: command.line,
                exit_code: output.exit_code,
                output: output.combined_lines(),
            });
        }

        let pid = parser::parse_launch_output(&output.stdout).map_err(|_| {
            SchedError::UnsupportedOutputFormat {
                command: command.line.clone(),
                output: output.combined_lines(),
            }
        })?;
        info!("process id: {}", pid);

        Ok(SubmissionResult {
            job_id: pid.to_string(),
            raw_output: output.combined_lines(),
        })
    }

    async fn status(&self, job_id: &str) -> SchedResult<StatusResult> {
        let pid = pid_arg(job_id)?;
        let output = self
            .runner
            .run(&ShellCommand::new(format!("ps -p {pid}")))
            .await?;

        let status = if output.success() {
            JobStatus::Running
        } else {
            JobStatus::Finished
        };

        Ok(StatusResult {
            status,
            raw_output: output.stdout_lines(),
        })
    }

    async fn all_status(&self) -> SchedResult<ListResult> {
        let output = self.runner.run(&ShellCommand::new("ps -ef")).await?;
        Ok(ListResult {
            raw_output: output.stdout_lines(),
        })
    }

    async fn delete(&self, job_id: &str) -> SchedResult<DeleteResult> {
        let pid = pid_arg(job_id)?;
        let output = self
            .runner
            .run(&ShellCommand::new(format!("kill {pid}")))
            .await?;

        let raw_output = if output.success() {
            output.stdout_lines()
        } else {
            warn!("kill {} exited with rc={}", pid, output.exit_code);
            vec![format!("kill failed: rc={}", output.exit_code)]
        };

        Ok(DeleteResult { raw_output })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{CommandOutput, MockRunner};

    fn adapter(runner: Arc<MockRunner>, dir: &Path) -> LocalAdapter {
        LocalAdapter::new(SchedulerConfig::default().with_work_dir(dir), runner)
    }

    #[tokio::test]
    async fn test_submit_returns_pid() {
        let dir = tempfile::tempdir().unwrap();
        let work_dir = dir.path().join("work");
        let runner = Arc::new(MockRunner::new().respond(CommandOutput::new(0, "12345\n")));
        let local = adapter(runner.clone(), &work_dir);

        let result = local.submit(Path::new("/jobs/job_xsub.sh")).await.unwrap();
        assert_eq!(result.job_id, "12345");
        assert_eq!(parser::parse_pid(&result.job_id), Some(12345));
        assert!(work_dir.is_dir());

        let call = &runner.calls()[0];
        assert_eq!(
            call.line,
            "nohup bash /jobs/job_xsub.sh > /dev/null 2>&1 < /dev/null & echo $!"
        );
        assert_eq!(call.current_dir.as_deref(), Some(work_dir.as_path()));
    }

    #[tokio::test]
    async fn test_submit_launch_failure() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockRunner::new()
                .respond(CommandOutput::new(127, "").with_stderr("sh: nohup: not found\n")),
        );
        let local = adapter(runner, dir.path());

        let err = local.submit(Path::new("/jobs/job.sh")).await.unwrap_err();
        match err {
            SchedError::CommandFailed {
                exit_code, output, ..
            } => {
                assert_eq!(exit_code, 127);
                assert_eq!(output, ["sh: nohup: not found"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_status_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            MockRunner::new()
                .respond(CommandOutput::new(
                    0,
                    "  PID TTY          TIME CMD\n12345 ?  00:00:00 bash\n",
                ))
                .respond(CommandOutput::new(1, "  PID TTY          TIME CMD\n"))
                .respond(
                    CommandOutput::new(1, "")
                        .with_stderr("kill: (12345) - No such process\n"),
                ),
        );
        let local = adapter(runner.clone(), dir.path());

        assert_eq!(local.status("12345").await.unwrap().status, JobStatus::Running);
        assert_eq!(local.status("12345").await.unwrap().status, JobStatus::Finished);

        let deleted = local.delete("12345").await.unwrap();
        assert_eq!(deleted.raw_output, ["kill failed: rc=1"]);

        let lines: Vec<_> = runner.calls().into_iter().map(|c| c.line).collect();
        assert_eq!(lines, ["ps -p 12345", "ps -p 12345", "kill 12345"]);
    }

    #[tokio::test]
    async fn test_non_pid_job_id_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(MockRunner::new());
        let local = adapter(runner.clone(), dir.path());

        assert!(matches!(
            local.status("1; rm -rf /").await,
            Err(SchedError::Validation(_))
        ));
        assert!(matches!(local.delete("abc").await, Err(SchedError::Validation(_))));
        assert!(runner.calls().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_real_detached_job() {
        use crate::process::ShellRunner;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("job.sh");
        std::fs::write(&script, "echo done > marker.txt\n").unwrap();

        let local = LocalAdapter::new(
            SchedulerConfig::default().with_work_dir(dir.path().join("work")),
            Arc::new(ShellRunner::new()),
        );
        let result = local.submit(&script).await.unwrap();
        assert!(parser::parse_pid(&result.job_id).is_some());

        let marker = dir.path().join("work").join("marker.txt");
        for _ in 0..100 {
            if std::fs::read_to_string(&marker).is_ok_and(|s| s == "done\n") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert_eq!(std::fs::read_to_string(marker).unwrap(), "done\n");
    }
}
