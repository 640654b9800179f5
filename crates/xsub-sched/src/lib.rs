//! xsub batch-scheduler adapters
//!
//! A uniform layer for submitting, polling and cancelling compute jobs
//! without knowing which batch system sits underneath.
//!
//! # Overview
//!
//! - A [`Schema`] per backend declares the submission parameters and their
//!   defaults; caller values are merged over them and validated.
//! - The backend's template is rendered with the resolved parameters, the
//!   working directory and the job file into a submission script.
//! - A [`Scheduler`] implementation runs the backend's command-line tools
//!   through an injected [`CommandRunner`] and parses their text output into
//!   a job id or a portable [`JobStatus`].
//!
//! # Supported Backends
//!
//! | Name | Adapter | Commands |
//! |------|---------|----------|
//! | `none` | [`LocalAdapter`] | `nohup bash`, `ps`, `kill` |
//! | `k` | [`PjmAdapter`] | `pjsub`, `pjstat`, `pjdel` |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xsub_sched::{ParameterMap, SchedulerConfig, ShellRunner, build_scheduler, submit_job};
//!
//! let config = SchedulerConfig::from_env()?.with_work_dir("run1");
//! let scheduler = build_scheduler(config, Arc::new(ShellRunner::new()));
//!
//! let mut params = ParameterMap::new();
//! params.insert("mpi_procs".into(), "16".into());
//! let job = submit_job(scheduler.as_ref(), "job.sh".as_ref(), &params).await?;
//!
//! let status = scheduler.status(&job.job_id).await?;
//! println!("{} is {}", job.job_id, status.status);
//! ```

pub mod error;
pub mod job;
pub mod none;
pub mod path;
pub mod pjm;
pub mod process;
pub mod scheduler;
pub mod schema;
pub mod submit;
pub mod template;

pub use error::{SchedError, SchedResult};
pub use job::{
    DeleteResult, JobStatus, ListResult, StatusResult, SubmissionResult, SubmittedJob,
};
pub use none::LocalAdapter;
pub use pjm::{PjmAdapter, PjmState};
pub use process::{CommandOutput, CommandRunner, MockRunner, ShellCommand, ShellRunner};
pub use scheduler::{SCHEDULER_ENV, Scheduler, SchedulerConfig, SchedulerType, build_scheduler};
pub use schema::{ParameterMap, ParameterSpec, Schema, parameters_from_json};
pub use submit::submit_job;
pub use template::{TemplateContext, render};
