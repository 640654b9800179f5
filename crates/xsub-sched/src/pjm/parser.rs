//! Parsers for PJM command output.
//!
//! The formats below were captured from `pjsub`/`pjstat` on the K computer
//! (Fujitsu Technical Computing Suite). They are matched literally; a change
//! in the tool's wording needs a change here.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{SchedError, SchedResult};
use crate::job::JobStatus;

/// Field of the `submitted` line holding the job id:
/// `[INFO] PJM 0000 pjsub Job 2275991 submitted.`
const SUBMITTED_ID_FIELD: usize = 5;

/// Field of a `pjstat` job line holding the state code.
const STATE_FIELD: usize = 3;

/// `(J5333b14881e31ebcd2000001.sh.s2366652)` in a staging error; the digits
/// after `.sh.s` are the job id.
static STAGING_ERROR_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(J[0-9a-f]+\.sh\.s(\d+)\)").expect("staging id pattern"));

/// PJM job state.
///
/// `pjstat` prints three-letter codes in the `ST` column:
/// - ACC: accepted
/// - QUE: waiting in queue
/// - SIN: staging in
/// - RDY: ready to run
/// - RNA: acquiring resources
/// - RUN: running
/// - RNO: finishing
/// - SOT: staging out
/// - EXT: exited
/// - CCL: cancelled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PjmState {
    Accepted,
    Queued,
    StagingIn,
    Ready,
    Allocating,
    Running,
    Finishing,
    StagingOut,
    Exited,
    Cancelled,
    /// Any code not listed above.
    Unknown(String),
}

impl PjmState {
    /// Parse a state code from the `ST` column.
    pub fn from_code(code: &str) -> Self {
        match code {
            "ACC" => PjmState::Accepted,
            "QUE" => PjmState::Queued,
            "SIN" => PjmState::StagingIn,
            "RDY" => PjmState::Ready,
            "RNA" => PjmState::Allocating,
            "RUN" => PjmState::Running,
            "RNO" => PjmState::Finishing,
            "SOT" => PjmState::StagingOut,
            "EXT" => PjmState::Exited,
            "CCL" => PjmState::Cancelled,
            other => PjmState::Unknown(other.to_string()),
        }
    }

    /// Collapse into the portable status. Unknown codes count as finished.
    pub fn job_status(&self) -> JobStatus {
        match self {
            PjmState::Accepted | PjmState::Queued => JobStatus::Queued,
            PjmState::StagingIn
            | PjmState::Ready
            | PjmState::Allocating
            | PjmState::Running
            | PjmState::Finishing
            | PjmState::StagingOut => JobStatus::Running,
            PjmState::Exited | PjmState::Cancelled | PjmState::Unknown(_) => JobStatus::Finished,
        }
    }
}

/// Job id from a successful `pjsub` line, if `line` is one.
pub fn submitted_job_id(line: &str) -> Option<&str> {
    if !line.contains("submitted") {
        return None;
    }
    line.split_whitespace().nth(SUBMITTED_ID_FIELD)
}

/// Job id embedded in a staging error message.
pub fn staging_error_job_id(output: &str) -> Option<&str> {
    STAGING_ERROR_ID
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Parse `pjsub` stdout to extract the job id.
///
/// `pjsub` exits 0 even for some failed submissions (staging errors), so the
/// text decides:
///
/// ```text
/// [INFO] PJM 0000 pjsub Job 2275991 submitted.
/// [ERR.] PJM 0007 pjsub Staging option error (3).
/// Refer to the staging information file. (J5333b14881e31ebcd2000001.sh.s2366652)
/// ```
pub fn parse_pjsub_output(stdout: &str) -> SchedResult<String> {
    if let Some(line) = stdout.lines().find(|l| l.contains("submitted")) {
        return submitted_job_id(line)
            .map(str::to_string)
            .ok_or_else(|| unsupported("pjsub", stdout));
    }

    staging_error_job_id(stdout)
        .map(str::to_string)
        .ok_or_else(|| unsupported("pjsub", stdout))
}

/// Parse `pjstat <id>` stdout into the job's native state.
///
/// ```text
///   ACCEPT QUEUED  STGIN  READY RUNING RUNOUT STGOUT   HOLD  ERROR   TOTAL
///        0      0      0      0      1      0      0      0      0       1
/// s      0      0      0      0      1      0      0      0      0       1
///
/// JOB_ID     JOB_NAME   MD ST  USER     START_DATE      ELAPSE_LIM NODE_REQUIRE
/// 2275991    job_xsub.sh NM RUN hpc0001  12/03 14:21:05  0001:00:00 1
/// ```
///
/// Only the last non-blank line is inspected.
pub fn parse_pjstat_output(stdout: &str) -> SchedResult<PjmState> {
    let last = stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| unsupported("pjstat", stdout))?;

    last.split_whitespace()
        .nth(STATE_FIELD)
        .map(PjmState::from_code)
        .ok_or_else(|| unsupported("pjstat", stdout))
}

fn unsupported(command: &str, output: &str) -> SchedError {
    SchedError::UnsupportedOutputFormat {
        command: command.to_string(),
        output: output.lines().map(str::to_string).collect(),
    }
}
