//! Process execution for dockhand.
//!
//! Every external invocation dockhand makes (all of them `npm`) goes
//! through the [`CommandRunner`] trait so the engine can be exercised
//! with fakes in tests. The real [`ProcessRunner`] blocks on the child
//! process and traces each command before running it.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use dockhand_process::{CommandRunner, CommandSpec, ProcessRunner};
//!
//! let spec = CommandSpec::new("npm", ["--version"], Path::new("."));
//! let result = ProcessRunner.run_captured(&spec).expect("run");
//! assert!(result.success);
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};

/// A fully specified external command: program, argument vector, and
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub dir: PathBuf,
}

impl CommandSpec {
    pub fn new<I, S>(program: &str, args: I, dir: &Path) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            dir: dir.to_path_buf(),
        }
    }

    /// The command line as a single display string, e.g.
    /// `npm view left-pad versions --json`.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0).
    pub success: bool,
    /// Exit code (if available).
    pub exit_code: Option<i32>,
    /// Standard output (empty for streamed executions).
    pub stdout: String,
    /// Standard error (empty for streamed executions).
    pub stderr: String,
    /// Duration of execution.
    pub duration_ms: u64,
}

impl CommandResult {
    fn from_output(output: &Output, duration: Duration) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

/// Capability for running external commands.
///
/// `run_captured` buffers stdout/stderr for parsing; `run_streaming`
/// inherits the parent's stdio so CI logs show progress live.
pub trait CommandRunner {
    fn run_captured(&mut self, spec: &CommandSpec) -> Result<CommandResult>;

    fn run_streaming(&mut self, spec: &CommandSpec) -> Result<CommandResult>;
}

/// Runs commands as real blocking child processes.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run_captured(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        trace(spec);
        let start = std::time::Instant::now();

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.dir)
            .output()
            .with_context(|| {
                format!(
                    "failed to run command: {} in {}",
                    spec.display_line(),
                    spec.dir.display()
                )
            })?;

        Ok(CommandResult::from_output(&output, start.elapsed()))
    }

    fn run_streaming(&mut self, spec: &CommandSpec) -> Result<CommandResult> {
        trace(spec);
        let start = std::time::Instant::now();

        let output = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.dir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| {
                format!(
                    "failed to run command: {} in {}",
                    spec.display_line(),
                    spec.dir.display()
                )
            })?;

        Ok(CommandResult::from_output(&output, start.elapsed()))
    }
}

/// Write the command to the log before it is executed. Used for
/// auditing CI builds.
fn trace(spec: &CommandSpec) {
    log::info!("+ {} (in {})", spec.display_line(), spec.dir.display());
}

/// Check if a command exists in PATH.
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}
