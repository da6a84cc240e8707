//! External command execution.

use kiln_error::{StepError, StepResult};
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// A command line to run synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Kill the child and fail the step after this long. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
        }
    }

    /// Run `line` through the platform shell.
    pub fn shell(line: impl Into<String>) -> Self {
        let line = line.into();
        if cfg!(windows) {
            Self::new("cmd").args(["/C".to_string(), line])
        } else {
            Self::new("sh").args(["-c".to_string(), line])
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Spawn the command and wait for it. A nonzero exit is returned, not raised.
pub fn run_command(spec: &CommandSpec) -> StepResult<ExitStatus> {
    let mut cmd = Command::new(&spec.program);
    // Avoid commands hanging waiting for input.
    cmd.args(&spec.args).stdin(Stdio::null());
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }

    log::info!("Running command: {}", spec);
    let mut child = cmd.spawn().map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => StepError::CommandNotFound(spec.program.clone()),
        _ => StepError::Io(err),
    })?;

    let Some(timeout) = spec.timeout else {
        return Ok(child.wait()?);
    };
    match child.wait_timeout(timeout)? {
        Some(status) => Ok(status),
        None => {
            let _ = child.kill();
            let _ = child.wait();
            Err(StepError::CommandTimeout {
                program: spec.program.clone(),
                timeout,
            })
        }
    }
}
