//! Builder and runner seam for executing external tool commands.
//!
//! Every external process goes through a [`CommandRunner`]. The runner only
//! reports what happened; [`ToolCommand::execute`] decides what counts as a
//! failure, so classification lives in one place no matter which runner
//! (real or scripted) is in use.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use stickerforge_core::{Error, Result};

/// Output captured from a tool execution.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Exit code, `None` if the process was killed by a signal.
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes a fully-built [`ToolCommand`] and reports its raw outcome.
///
/// Implementations block until the process exits. They return `Err` only
/// when the process could not be run at all; a non-zero exit is an `Ok`
/// with the code recorded.
pub trait CommandRunner: Send + Sync {
    /// Run `command` to completion.
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.arguments())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = command.working_dir() {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .map_err(|e| Error::tool(command.program_name(), format!("failed to spawn: {e}")))?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use stickerforge_av::{SystemRunner, ToolCommand};
///
/// let output = ToolCommand::new("webpmux")
///     .args(["-set", "exif", "raw.exif", "in.webp", "-o", "out.webp"])
///     .current_dir("downloads/42")
///     .execute(&SystemRunner)?;
/// assert!(output.success());
/// # Ok::<(), stickerforge_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    work_dir: Option<PathBuf>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Append a path argument.
    pub fn path_arg(&mut self, path: &Path) -> &mut Self {
        self.args.push(path.display().to_string());
        self
    }

    /// Run the process in `dir`.
    pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// The program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Short tool name used in errors and logs (file name of the program).
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Arguments in order.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, if one was set.
    pub fn working_dir(&self) -> Option<&Path> {
        self.work_dir.as_deref()
    }

    /// Execute the command through `runner`, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] carrying the captured stderr if the process
    /// exits with a non-zero status, and whatever the runner reports if the
    /// process could not be spawned.
    pub fn execute(&self, runner: &dyn CommandRunner) -> Result<ToolOutput> {
        let tool = self.program_name();
        tracing::debug!(tool = %tool, args = ?self.args, "running external tool");

        let output = runner.run(self)?;
        if !output.success() {
            let status = output
                .code
                .map(|c| format!("exit status {c}"))
                .unwrap_or_else(|| "terminated by signal".to_string());
            tracing::debug!(tool = %tool, %status, stderr = %output.stderr.trim(), "external tool failed");
            return Err(Error::tool(
                tool,
                format!("{status}: {}", output.stderr.trim()),
            ));
        }
        Ok(output)
    }
}
