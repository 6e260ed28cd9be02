use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures while resolving, downloading or verifying a host build.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The requested version label is empty.
    #[error("invalid host version label '{label}'")]
    InvalidVersion {
        /// Label as supplied.
        label: String,
    },
    /// No host build is published for this machine.
    #[error("no host build is available for {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system name.
        os: String,
        /// CPU architecture name.
        arch: String,
    },
    /// The cache directory could not be prepared.
    #[error("failed to prepare host cache '{path}': {source}")]
    Cache {
        /// Cache path involved.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to construct download client: {source}")]
    Client {
        /// Underlying client failure.
        #[source]
        source: reqwest::Error,
    },
    /// The archive could not be downloaded.
    #[error("failed to download host build from {url}: {source}")]
    Download {
        /// Requested URL.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },
    /// The downloaded archive could not be written to disk.
    #[error("failed to write host archive '{path}': {source}")]
    WriteArchive {
        /// Archive path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The downloaded archive could not be reopened for unpacking.
    #[error("failed to open host archive '{path}': {source}")]
    OpenArchive {
        /// Archive path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A tarball could not be unpacked.
    #[error("failed to unpack host archive '{path}': {source}")]
    UnpackTar {
        /// Archive path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// A zip archive could not be unpacked.
    #[error("failed to unpack host archive '{path}': {source}")]
    UnpackZip {
        /// Archive path.
        path: PathBuf,
        /// Underlying zip failure.
        #[source]
        source: zip::result::ZipError,
    },
    /// The host executable is absent after download or at the override path.
    #[error("host executable not found at '{path}'")]
    ExecutableMissing {
        /// Expected executable path.
        path: PathBuf,
    },
    /// The host CLI could not be started for verification.
    #[error("failed to run host CLI '{path}': {source}")]
    Verify {
        /// CLI path.
        path: PathBuf,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
}
