//! The full submission pipeline: validate, render, write, submit.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{SchedError, SchedResult};
use crate::job::SubmittedJob;
use crate::path;
use crate::scheduler::Scheduler;
use crate::schema::ParameterMap;

/// Suffix added to the job file's stem to name the rendered script.
const PARENT_SCRIPT_SUFFIX: &str = "_xsub";

/// Submit `job_file` through `scheduler`.
///
/// Parameters are resolved and validated before anything touches the disk or
/// runs a command. The rendered script is written into the working directory
/// next to earlier ones, never over them.
pub async fn submit_job(
    scheduler: &dyn Scheduler,
    job_file: &Path,
    params: &ParameterMap,
) -> SchedResult<SubmittedJob> {
    let job_file = path::expand(job_file)?;
    if !fs::try_exists(&job_file).await? {
        return Err(SchedError::JobFileNotFound(job_file));
    }

    let parameters = scheduler.resolve(params)?;
    let script = scheduler.render(&parameters, &job_file)?;

    let work_dir = path::expand(&scheduler.config().work_dir)?;
    fs::create_dir_all(&work_dir).await?;
    let parent_script = write_parent_script(&work_dir, &job_file, &script).await?;
    info!("{} is created", parent_script.display());

    let result = scheduler.submit(&parent_script).await?;
    Ok(SubmittedJob::new(result, parent_script, parameters))
}

/// Create `<stem>_xsub.sh`, or `<stem>_xsub<N>.sh` with the smallest free N,
/// and write `script` into it.
///
/// Names are claimed with `create_new`, so concurrent submissions into the
/// same directory never share or truncate a script.
pub async fn write_parent_script(
    work_dir: &Path,
    job_file: &Path,
    script: &str,
) -> SchedResult<PathBuf> {
    let stem = job_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "job".to_string());

    let mut n: u32 = 0;
    loop {
        let name = match n {
            0 => format!("{stem}{PARENT_SCRIPT_SUFFIX}.sh"),
            n => format!("{stem}{PARENT_SCRIPT_SUFFIX}{n}.sh"),
        };
        let candidate = work_dir.join(name);

        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(mut file) => {
                file.write_all(script.as_bytes()).await?;
                file.flush().await?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e.into()),
        }

        n = n
            .checked_add(1)
            .ok_or_else(|| SchedError::Config("no free parent script name".to_string()))?;
    }
}
