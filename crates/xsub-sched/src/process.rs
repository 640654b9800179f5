//! The process boundary: every scheduler call goes through a [`CommandRunner`].
//!
//! Adapters receive a runner at construction. [`ShellRunner`] executes the
//! command line with `sh -c`; [`MockRunner`] replays captured tool output so
//! parsing rules can be tested without the scheduler installed.

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{SchedError, SchedResult};

/// One shell command line plus the directory to run it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    /// The full command line, already quoted.
    pub line: String,
    /// Working directory; the caller's directory when `None`.
    pub current_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            current_dir: None,
        }
    }

    /// Run the command from `dir`.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.current_dir {
            Some(dir) => write!(f, "cd {} && {}", dir.display(), self.line),
            None => f.write_str(&self.line),
        }
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `-1` when the process was killed by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a command that exited with `exit_code` and printed `stdout`.
    pub fn new(exit_code: i32, stdout: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout split into lines without terminators.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout.lines().map(str::to_string).collect()
    }

    /// Stdout lines followed by stderr lines.
    pub fn combined_lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::to_string)
            .collect()
    }
}

/// Runs shell commands on behalf of a scheduler adapter.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion and capture its output.
    ///
    /// A nonzero exit code is not an error at this level; only failing to
    /// start the shell is.
    async fn run(&self, command: &ShellCommand) -> SchedResult<CommandOutput>;
}

/// Runs commands through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ShellCommand) -> SchedResult<CommandOutput> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(&command.line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        let output = cmd.output().await.map_err(|source| SchedError::Spawn {
            command: command.line.clone(),
            source,
        })?;

        let result = CommandOutput {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(
            "`{}` exited with rc={} ({} bytes stdout, {} bytes stderr)",
            command.line,
            result.exit_code,
            result.stdout.len(),
            result.stderr.len()
        );
        Ok(result)
    }
}

/// Replays scripted outputs in order and records every command it was asked to run.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Mutex<VecDeque<CommandOutput>>,
    calls: Mutex<Vec<ShellCommand>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output for the next command.
    pub fn respond(self, output: CommandOutput) -> Self {
        self.push(output);
        self
    }

    pub fn push(&self, output: CommandOutput) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(output);
    }

    /// Commands run so far, oldest first.
    pub fn calls(&self) -> Vec<ShellCommand> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &ShellCommand) -> SchedResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(command.clone());
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| SchedError::Spawn {
                command: command.line.clone(),
                source: std::io::Error::other("no scripted output left"),
            })
    }
}

/// Quote one shell word.
pub fn quote(word: &str) -> SchedResult<String> {
    shlex::try_quote(word)
        .map(|quoted| quoted.into_owned())
        .map_err(|e| SchedError::Validation(format!("cannot quote {word:?} for the shell: {e}")))
}

/// Quote a path as one shell word.
pub fn quote_path(path: &Path) -> SchedResult<String> {
    quote(&path.to_string_lossy())
}
