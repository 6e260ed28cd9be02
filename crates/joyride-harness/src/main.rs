//! Entry point for `joyride-test`.
//!
//! Delegates to [`joyride_harness::run`], which loads configuration, provisions
//! the isolated host, and maps the outcome to the process exit status.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    joyride_harness::run(std::env::args_os(), &mut stdout, &mut stderr)
}
