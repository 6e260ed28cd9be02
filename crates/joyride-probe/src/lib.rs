//! Cold-load benchmark for the built joyride.js bundle.
//!
//! The probe checks that `<extension-dir>/out/joyride.js` exists, stages a
//! mock of the host API next to it, performs one warm-up load followed by a
//! configurable number of cold loads, and reports the raw and outlier-trimmed
//! mean load times. The binary entry point is [`run`].

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
mod error;
pub mod loader;
pub mod probe;
pub mod staging;
pub mod stats;

#[cfg(test)]
mod tests;

use cli::Cli;
use error::AppError;
pub use error::ProbeError;
pub use loader::{BundleLoader, NodeBundleLoader};
pub use probe::{ProbeReport, ProbeRequest, run_probe};
pub use stats::{LoadSample, LoadStatistics};

const PROBE_TARGET: &str = "joyride_probe";

/// Runs the probe with the provided arguments and output streams.
///
/// The report goes to `stdout`. Usage errors, a missing bundle and load
/// failures are written to `stderr` and yield [`ExitCode::FAILURE`].
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

    match execute(&cli, &split.config_arguments, stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            error!(target: PROBE_TARGET, error = %failure, "bundle load check failed");
            emit(stderr, &failure);
            ExitCode::FAILURE
        }
    }
}

fn execute<W: Write>(
    cli: &Cli,
    config_arguments: &[OsString],
    stdout: &mut W,
) -> Result<(), AppError> {
    let config = Config::load_from_iter(config_arguments.iter().cloned())
        .map_err(AppError::LoadConfiguration)?;
    telemetry::initialise(&config)?;

    let loader = NodeBundleLoader::new(&cli.node);
    let report = run_probe(&cli.request(), &loader)?;
    report.write_to(stdout)?;
    Ok(())
}

fn emit<S: Write>(stream: &mut S, message: &dyn Display) {
    if let Err(write_error) = writeln!(stream, "{message}") {
        warn!(target: PROBE_TARGET, error = %write_error, "failed to write diagnostic");
    }
}
