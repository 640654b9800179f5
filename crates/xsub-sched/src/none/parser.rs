//! Parsers for the local launcher output.

use crate::error::{SchedError, SchedResult};

/// Parse a process id.
pub fn parse_pid(text: &str) -> Option<u32> {
    text.trim().parse().ok().filter(|pid| *pid > 0)
}

/// The launcher prints `$!` last; everything before it is noise from the shell.
pub fn parse_launch_output(stdout: &str) -> SchedResult<u32> {
    stdout
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .and_then(parse_pid)
        .ok_or_else(|| SchedError::UnsupportedOutputFormat {
            command: "nohup bash".to_string(),
            output: stdout.lines().map(str::to_string).collect(),
        })
}
