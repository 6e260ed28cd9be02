//! Installs a packaged extension into the acquired host.

use std::convert::Infallible;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use crate::command::{CommandRunner, HostExit, HostInvocation};
use crate::host::{HostInstallation, HostProfile};

const INSTALL_TARGET: &str = "joyride_harness::install";

/// Label selecting the in-place development build instead of an artifact.
pub const DEVELOPMENT_SENTINEL: &str = "extension-development";

/// Where the extension under test comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSource {
    /// Load the extension straight from the repository working tree.
    Development,
    /// Install a packaged artifact (path or marketplace identifier).
    Artifact(String),
}

impl ExtensionSource {
    /// Returns `true` for the in-place development build.
    #[must_use]
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for ExtensionSource {
    type Err = Infallible;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(if value == DEVELOPMENT_SENTINEL {
            Self::Development
        } else {
            Self::Artifact(value.to_owned())
        })
    }
}

impl fmt::Display for ExtensionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str(DEVELOPMENT_SENTINEL),
            Self::Artifact(reference) => f.write_str(reference),
        }
    }
}

/// Failures of the install subprocess.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The host CLI could not be started.
    #[error("failed to launch host CLI '{cli}': {source}")]
    Spawn {
        /// CLI path.
        cli: PathBuf,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The host CLI reported a failed install.
    #[error("installing '{reference}' failed with {status}")]
    NonZeroExit {
        /// Artifact reference passed to the host.
        reference: String,
        /// Exit report of the CLI.
        status: HostExit,
    },
}

/// Outcome of the install step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Development builds need no install.
    Skipped,
    /// The artifact was installed.
    Installed,
}

/// Builds the CLI invocation that installs `reference`.
#[must_use]
pub fn install_invocation(
    host: &HostInstallation,
    reference: &str,
    workspace: &Path,
    profile: &HostProfile,
) -> HostInvocation {
    HostInvocation::new(host.cli_path())
        .arg(workspace)
        .args(profile.launch_arguments())
        .args(["--install-extension", reference])
        .args(["--force", "--disable-workspace-trust", "--verbose"])
}

/// Installs `source` into the host, or does nothing for development builds.
///
/// # Errors
///
/// Returns [`InstallError`] when the CLI cannot be started or exits
/// unsuccessfully.
pub fn install_extension<R: CommandRunner + ?Sized>(
    runner: &R,
    host: &HostInstallation,
    source: &ExtensionSource,
    workspace: &Path,
    profile: &HostProfile,
) -> Result<InstallOutcome, InstallError> {
    let ExtensionSource::Artifact(reference) = source else {
        return Ok(InstallOutcome::Skipped);
    };

    info!(target: INSTALL_TARGET, %reference, "installing extension");
    let invocation = install_invocation(host, reference, workspace, profile);
    let exit = runner
        .run(&invocation)
        .map_err(|source_error| InstallError::Spawn {
            cli: host.cli_path().to_path_buf(),
            source: source_error,
        })?;
    if !exit.success() {
        return Err(InstallError::NonZeroExit {
            reference: reference.clone(),
            status: exit,
        });
    }
    info!(target: INSTALL_TARGET, %reference, "extension installed");
    Ok(InstallOutcome::Installed)
}
