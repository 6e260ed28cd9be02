//! Host subprocess invocations.
//!
//! Every host launch (CLI probe, extension install, test run) is described as
//! a [`HostInvocation`] and executed through a [`CommandRunner`]. The
//! production runner inherits stdio so host diagnostics stay visible; tests
//! substitute a recording runner that never spawns anything.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

const COMMAND_TARGET: &str = "joyride_harness::command";

/// A fully described host subprocess launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInvocation {
    program: PathBuf,
    arguments: Vec<OsString>,
    removed_env: Vec<OsString>,
}

impl HostInvocation {
    /// Starts an invocation of `program` without arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            arguments: Vec::new(),
            removed_env: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, argument: impl Into<OsString>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Appends several arguments in order.
    #[must_use]
    pub fn args<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.arguments.extend(arguments.into_iter().map(Into::into));
        self
    }

    /// Strips a variable from the inherited environment.
    #[must_use]
    pub fn env_remove(mut self, key: impl Into<OsString>) -> Self {
        self.removed_env.push(key.into());
        self
    }

    /// Program to execute.
    #[must_use]
    pub fn program(&self) -> &Path {
        self.program.as_path()
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.arguments
    }

    /// Variables removed from the child environment.
    #[must_use]
    pub fn removed_env(&self) -> &[OsString] {
        &self.removed_env
    }

    /// Returns `true` when `argument` appears verbatim in the argument list.
    #[must_use]
    pub fn has_argument(&self, argument: impl AsRef<OsStr>) -> bool {
        let needle = argument.as_ref();
        self.arguments.iter().any(|candidate| candidate == needle)
    }
}

/// Exit report of a finished host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostExit {
    code: Option<i32>,
}

impl HostExit {
    /// Builds a report from a raw exit code; `None` means signal termination.
    #[must_use]
    pub const fn from_code(code: Option<i32>) -> Self {
        Self { code }
    }

    /// Raw exit code, when the process exited normally.
    #[must_use]
    pub const fn code(self) -> Option<i32> {
        self.code
    }

    /// Returns `true` for a zero exit code.
    #[must_use]
    pub const fn success(self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl fmt::Display for HostExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit code {code}"),
            None => f.write_str("termination by signal"),
        }
    }
}

/// Executes host invocations, blocking until the process exits.
pub trait CommandRunner {
    /// Runs the invocation to completion.
    ///
    /// # Errors
    ///
    /// Returns the spawn or wait failure reported by the operating system.
    fn run(&self, invocation: &HostInvocation) -> io::Result<HostExit>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, invocation: &HostInvocation) -> io::Result<HostExit> {
        (**self).run(invocation)
    }
}

/// Runs invocations as real child processes with inherited stdio.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, invocation: &HostInvocation) -> io::Result<HostExit> {
        let mut command = build_command(invocation);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        for key in invocation.removed_env() {
            command.env_remove(key);
        }

        debug!(
            target: COMMAND_TARGET,
            program = %invocation.program().display(),
            arguments = ?invocation.arguments(),
            "spawning host process"
        );
        let status = command.status()?;
        debug!(target: COMMAND_TARGET, ?status, "host process exited");
        Ok(HostExit::from_code(status.code()))
    }
}

// Batch wrappers (`code.cmd`) cannot be spawned directly on Windows.
fn build_command(invocation: &HostInvocation) -> Command {
    let is_batch = invocation
        .program()
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("cmd"));
    if cfg!(windows) && is_batch {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(invocation.program());
        command.args(invocation.arguments());
        command
    } else {
        let mut command = Command::new(invocation.program());
        command.args(invocation.arguments());
        command
    }
}
