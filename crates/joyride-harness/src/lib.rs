//! Integration-test harness for the Joyride extension.
//!
//! A run provisions an isolated user-configuration directory, resolves a
//! pinned host build, optionally installs a packaged extension into it, and
//! launches the host against a test workspace. The binary entry point is
//! [`run`]; the individual stages are public so embedding tools and tests can
//! drive them with substitute collaborators.

use std::ffi::OsString;
use std::fmt::Display;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use joyride_config::{Config, split_config_arguments, telemetry};
use ortho_config::OrthoConfig;
use tracing::{error, warn};

mod cli;
pub mod command;
mod errors;
pub mod host;
pub mod install;
pub mod isolation;
pub mod pipeline;
pub mod runner;

use cli::{Cli, plan_run};
pub use errors::HarnessError;
use errors::AppError;
use host::{HostAcquirer, HttpFetcher, Platform};
pub use pipeline::{Collaborators, RunConfiguration, RunPlan, run_pipeline};

const HARNESS_TARGET: &str = "joyride_harness";

/// Runs the harness with the provided arguments and output streams.
///
/// Returns [`ExitCode::SUCCESS`] when the tests pass and
/// [`ExitCode::FAILURE`] on any usage, setup, acquisition, install or test
/// failure. Every guard created by the run is dropped before this returns.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let cli = match Cli::try_parse_from(&split.command_arguments) {
        Ok(cli) => cli,
        Err(usage) => {
            let informational = matches!(
                usage.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            );
            let rendered = usage.render();
            return if informational {
                emit(stdout, &rendered);
                ExitCode::SUCCESS
            } else {
                emit(stderr, &rendered);
                ExitCode::FAILURE
            };
        }
    };

    match execute(cli, &split.config_arguments) {
        Ok(_) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(target: HARNESS_TARGET, error = %failure, "test run failed");
            emit(stderr, &failure);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli, config_arguments: &[OsString]) -> Result<RunConfiguration, AppError> {
    let config = Config::load_from_iter(config_arguments.iter().cloned())
        .map_err(AppError::LoadConfiguration)?;
    telemetry::initialise(&config)?;

    let plan = plan_run(cli, &config)?;
    let acquirer = HostAcquirer::new(
        plan.cache_dir.clone(),
        Platform::current()?,
        HttpFetcher::new()?,
    );
    let mut collaborators = Collaborators {
        environment: isolation::ProcessEnvironment,
        acquirer,
        runner: command::SystemCommandRunner,
    };
    Ok(run_pipeline(&plan, &mut collaborators)?)
}

#[cfg(test)]
mod tests;

fn emit<S: Write>(stream: &mut S, message: &dyn Display) {
    if let Err(write_error) = writeln!(stream, "{message}") {
        warn!(target: HARNESS_TARGET, error = %write_error, "failed to write diagnostic");
    }
}
