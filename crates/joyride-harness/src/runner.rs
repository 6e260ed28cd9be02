//! Launches the host against the test workspace.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::command::{CommandRunner, HostExit, HostInvocation};
use crate::host::{HostInstallation, HostProfile, flag_with_path};

const RUNNER_TARGET: &str = "joyride_harness::runner";

/// Variable that makes the host executable behave as a plain Node runtime.
pub const ELECTRON_RUN_AS_NODE: &str = "ELECTRON_RUN_AS_NODE";

/// Failures of the test launch.
#[derive(Debug, Error)]
pub enum TestRunError {
    /// The host executable could not be started.
    #[error("failed to launch host '{executable}': {source}")]
    Spawn {
        /// Executable path.
        executable: PathBuf,
        /// Underlying spawn failure.
        #[source]
        source: io::Error,
    },
    /// The test instance exited unsuccessfully.
    #[error("test run failed with {status}")]
    Failed {
        /// Exit report of the host.
        status: HostExit,
    },
}

/// Everything needed to launch one test instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestLaunch<'a> {
    /// Acquired host build.
    pub host: &'a HostInstallation,
    /// Workspace folder opened by the host.
    pub workspace: &'a Path,
    /// Entry module driving the extension tests.
    pub extension_tests_path: &'a Path,
    /// Repository root, set only when testing the development build.
    pub development_path: Option<&'a Path>,
    /// Profile directories for the launch.
    pub profile: &'a HostProfile,
}

impl TestLaunch<'_> {
    /// Builds the host invocation for this launch.
    #[must_use]
    pub fn invocation(&self) -> HostInvocation {
        let mut invocation = HostInvocation::new(self.host.executable_path())
            .arg(self.workspace)
            .arg(flag_with_path(
                "--extensionTestsPath=",
                self.extension_tests_path,
            ));
        if let Some(root) = self.development_path {
            invocation = invocation.arg(flag_with_path("--extensionDevelopmentPath=", root));
        }
        invocation
            .args(self.profile.launch_arguments())
            .args([
                "--disable-workspace-trust",
                "--disable-updates",
                "--skip-welcome",
                "--skip-release-notes",
            ])
            .env_remove(ELECTRON_RUN_AS_NODE)
    }
}

/// Runs the test instance to completion.
///
/// # Errors
///
/// Returns [`TestRunError`] when the host cannot be started or exits with a
/// non-zero status or a signal.
pub fn run_tests<R: CommandRunner + ?Sized>(
    runner: &R,
    launch: &TestLaunch<'_>,
) -> Result<(), TestRunError> {
    info!(
        target: RUNNER_TARGET,
        workspace = %launch.workspace.display(),
        "launching test instance"
    );
    let exit = runner
        .run(&launch.invocation())
        .map_err(|source| TestRunError::Spawn {
            executable: launch.host.executable_path().to_path_buf(),
            source,
        })?;
    if exit.success() {
        info!(target: RUNNER_TARGET, "tests finished");
        Ok(())
    } else {
        Err(TestRunError::Failed { status: exit })
    }
}
