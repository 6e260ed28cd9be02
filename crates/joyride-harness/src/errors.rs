//! Error types surfaced by the harness.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use joyride_config::TelemetryError;
use thiserror::Error;

use crate::host::AcquisitionError;
use crate::install::InstallError;
use crate::isolation::IsolationError;
use crate::runner::TestRunError;

/// Failure of one pipeline stage.
///
/// Every variant is fatal: the run stops at the failing stage and the binary
/// exits with status 1.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The isolated user configuration could not be provisioned.
    #[error("failed to initialise test running environment: {0}")]
    Setup(#[from] IsolationError),
    /// The host build could not be resolved, downloaded or verified.
    #[error("failed to acquire host: {0}")]
    Acquisition(#[from] AcquisitionError),
    /// The extension artifact could not be installed.
    #[error("failed to install extension: {0}")]
    Install(#[from] InstallError),
    /// The test instance failed.
    #[error("failed to run tests: {0}")]
    TestExecution(#[from] TestRunError),
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to resolve path '{path}': {source}")]
    ResolvePath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare host acquisition: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error(transparent)]
    Harness(#[from] HarnessError),
}
