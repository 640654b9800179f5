//! The backend abstraction and backend selection.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{SchedError, SchedResult};
use crate::job::{DeleteResult, ListResult, StatusResult, SubmissionResult};
use crate::none::LocalAdapter;
use crate::pjm::PjmAdapter;
use crate::process::CommandRunner;
use crate::schema::{ParameterMap, Schema};
use crate::template::{self, TemplateContext};

/// Environment variable naming the backend to use.
pub const SCHEDULER_ENV: &str = "XSUB_TYPE";

/// The kind of batch scheduler to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchedulerType {
    /// No scheduler: run the script as a detached local process.
    #[default]
    Local,
    /// Fujitsu PJM (`pjsub`/`pjstat`/`pjdel`), as on the K computer.
    Pjm,
}

impl SchedulerType {
    /// Every supported backend.
    pub const ALL: [SchedulerType; 2] = [SchedulerType::Local, SchedulerType::Pjm];

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            SchedulerType::Local => "none",
            SchedulerType::Pjm => "k",
        }
    }
}

impl fmt::Display for SchedulerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchedulerType {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "local" => Ok(SchedulerType::Local),
            "k" | "pjm" => Ok(SchedulerType::Pjm),
            other => Err(SchedError::UnknownScheduler(other.to_string())),
        }
    }
}

/// Configuration shared by all backends.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Which backend to use.
    pub scheduler_type: SchedulerType,

    /// Directory the job runs in; the rendered script is written here.
    pub work_dir: PathBuf,

    /// Directory for scheduler-side stdout/stderr/statistics files.
    pub log_dir: PathBuf,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scheduler_type: SchedulerType::default(),
            work_dir: PathBuf::from("."),
            log_dir: PathBuf::from("."),
        }
    }
}

impl SchedulerConfig {
    /// Defaults, with the backend taken from `XSUB_TYPE` when set.
    pub fn from_env() -> SchedResult<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Like [`SchedulerConfig::from_env`] but reading variables through `lookup`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> SchedResult<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(SCHEDULER_ENV).filter(|v| !v.trim().is_empty()) {
            config.scheduler_type = value.parse().map_err(|_| {
                SchedError::Config(format!(
                    "{SCHEDULER_ENV}='{value}' is not a known scheduler"
                ))
            })?;
        }
        Ok(config)
    }

    pub fn with_scheduler(mut self, scheduler_type: SchedulerType) -> Self {
        self.scheduler_type = scheduler_type;
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = log_dir.into();
        self
    }
}

/// One concrete batch scheduler.
///
/// Every async operation runs exactly one external command through the
/// adapter's [`CommandRunner`] and waits for it to exit.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Canonical backend name.
    fn name(&self) -> &'static str;

    /// The submission script template.
    fn template(&self) -> &'static str;

    /// Parameters the template understands.
    fn schema(&self) -> &Schema;

    /// Backend configuration.
    fn config(&self) -> &SchedulerConfig;

    /// Structural checks on resolved parameters. Accepts everything by default.
    fn validate(&self, _params: &ParameterMap) -> SchedResult<()> {
        Ok(())
    }

    /// Merge defaults and validate. Runs no external command.
    fn resolve(&self, params: &ParameterMap) -> SchedResult<ParameterMap> {
        let resolved = self.schema().resolve(params);
        self.validate(&resolved)?;
        Ok(resolved)
    }

    /// Render the submission script for `job_file` with resolved parameters.
    fn render(&self, params: &ParameterMap, job_file: &Path) -> SchedResult<String> {
        let context = TemplateContext::for_job(params, &self.config().work_dir, job_file)?;
        template::render(self.template(), &context)
    }

    /// Submit an already rendered script.
    async fn submit(&self, script_path: &Path) -> SchedResult<SubmissionResult>;

    /// Query one job.
    async fn status(&self, job_id: &str) -> SchedResult<StatusResult>;

    /// List every job, unparsed.
    async fn all_status(&self) -> SchedResult<ListResult>;

    /// Cancel one job.
    async fn delete(&self, job_id: &str) -> SchedResult<DeleteResult>;
}

/// Build the backend named by `config.scheduler_type`.
pub fn build_scheduler(
    config: SchedulerConfig,
    runner: Arc<dyn CommandRunner>,
) -> Box<dyn Scheduler> {
    match config.scheduler_type {
        SchedulerType::Local => Box::new(LocalAdapter::new(config, runner)),
        SchedulerType::Pjm => Box::new(PjmAdapter::new(config, runner)),
    }
}
