//! Error types surfaced by the probe.

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;

use joyride_config::TelemetryError;
use thiserror::Error;

/// Failures while checking or timing the bundle.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The extension directory holds no built bundle.
    #[error("bundle not found at '{path}'")]
    BundleMissing {
        /// Expected bundle location.
        path: PathBuf,
    },
    /// The bundle exists but its metadata could not be read.
    #[error("failed to inspect bundle '{path}': {source}")]
    BundleMetadata {
        /// Bundle location.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The mock host-API package to stage does not exist.
    #[error("mock host API directory '{path}' does not exist")]
    MockSourceMissing {
        /// Configured mock source.
        path: PathBuf,
    },
    /// Something already occupies the staging destination.
    #[error("refusing to stage over existing directory '{path}'")]
    StagingConflict {
        /// Occupied destination.
        path: PathBuf,
    },
    /// Copying the mock package failed.
    #[error("failed to stage mock host API into '{path}': {source}")]
    Stage {
        /// Path being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Traversing the mock package failed.
    #[error("failed to read mock host API tree: {source}")]
    WalkMock {
        /// Traversal failure.
        #[source]
        source: walkdir::Error,
    },
    /// The loader process could not be started.
    #[error("failed to start '{}': {source}", .program.to_string_lossy())]
    LoaderSpawn {
        /// Loader executable.
        program: OsString,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The loader process failed to load the bundle.
    #[error("loading '{bundle}' failed with {status}")]
    LoaderFailed {
        /// Bundle being loaded.
        bundle: PathBuf,
        /// Exit status of the loader.
        status: ExitStatus,
    },
    /// The loader printed something other than a nanosecond count.
    #[error("unexpected loader output '{output}'")]
    LoaderOutput {
        /// Trimmed standard output of the loader.
        output: String,
    },
}

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("failed to initialise telemetry: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write report: {0}")]
    Report(#[from] io::Error),
    #[error(transparent)]
    Probe(#[from] ProbeError),
}
