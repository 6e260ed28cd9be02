//! End-to-end orchestration of one harness run.
//!
//! The stages run strictly in sequence: isolate the user configuration,
//! acquire the host, optionally verify its CLI, install the extension, and
//! launch the tests. The isolation guard lives for the whole run and is
//! released when [`run_pipeline`] returns, on success and failure alike.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::command::{CommandRunner, HostInvocation};
use crate::errors::HarnessError;
use crate::host::{
    AcquisitionError, ArchiveFetcher, HostAcquirer, HostInstallation, HostProfile, HostVersion,
};
use crate::install::{ExtensionSource, install_extension};
use crate::isolation::{Environment, IsolatedUserConfig};
use crate::runner::{TestLaunch, run_tests};

const PIPELINE_TARGET: &str = "joyride_harness::pipeline";

/// Inputs of a run, resolved from configuration and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    /// Host build to acquire.
    pub host_version: HostVersion,
    /// Workspace folder opened by the test instance.
    pub test_workspace: PathBuf,
    /// Extension under test.
    pub extension_source: ExtensionSource,
    /// Repository root used as the development extension path.
    pub repository_root: PathBuf,
    /// Extension-tests entry module.
    pub extension_tests_path: PathBuf,
    /// Cache root for host builds and isolated profiles.
    pub cache_dir: PathBuf,
    /// Operator-supplied host executable.
    pub host_executable: Option<PathBuf>,
    /// Directory provisioned when the user-config variable is unset.
    pub user_config_target: PathBuf,
    /// Launch with the developer's own profile.
    pub reuse_machine_install: bool,
    /// Leave the provisioned user-config directory behind.
    pub keep_user_config: bool,
    /// Skip the CLI `--version` probe.
    pub skip_host_verification: bool,
}

/// Immutable description of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfiguration {
    /// Host version label.
    pub host_version: String,
    /// Workspace folder the tests ran against.
    pub test_workspace: PathBuf,
    /// Extension under test.
    pub extension_source: ExtensionSource,
    /// User-config directory seen by the host.
    pub isolated_config_path: PathBuf,
}

/// Collaborators a run talks to.
#[derive(Debug)]
pub struct Collaborators<E, F, R> {
    /// Environment the user-config variable is exported into.
    pub environment: E,
    /// Acquirer resolving the host build.
    pub acquirer: HostAcquirer<F>,
    /// Runner executing host subprocesses.
    pub runner: R,
}

/// Runs every stage of the harness.
///
/// # Errors
///
/// Returns the first stage failure as a [`HarnessError`]; later stages do not
/// run.
pub fn run_pipeline<E, F, R>(
    plan: &RunPlan,
    collaborators: &mut Collaborators<E, F, R>,
) -> Result<RunConfiguration, HarnessError>
where
    E: Environment,
    F: ArchiveFetcher,
    R: CommandRunner,
{
    info!(
        target: PIPELINE_TARGET,
        "Using: extension {}, test workspace {}",
        plan.extension_source,
        plan.test_workspace.display()
    );

    let isolation = IsolatedUserConfig::provision(
        &mut collaborators.environment,
        &plan.user_config_target,
        plan.keep_user_config,
    )?;

    let host = match plan.host_executable.as_deref() {
        Some(executable) => collaborators
            .acquirer
            .locate(executable, &plan.host_version)?,
        None => collaborators.acquirer.acquire(&plan.host_version)?,
    };
    let profile = if plan.reuse_machine_install {
        HostProfile::Machine
    } else {
        HostProfile::isolated(&plan.cache_dir)
    };

    if plan.extension_source.is_development() && !plan.skip_host_verification {
        verify_host(&collaborators.runner, &host)?;
    }

    install_extension(
        &collaborators.runner,
        &host,
        &plan.extension_source,
        &plan.test_workspace,
        &profile,
    )?;

    let development_path = plan
        .extension_source
        .is_development()
        .then_some(plan.repository_root.as_path());
    run_tests(
        &collaborators.runner,
        &TestLaunch {
            host: &host,
            workspace: &plan.test_workspace,
            extension_tests_path: &plan.extension_tests_path,
            development_path,
            profile: &profile,
        },
    )?;

    Ok(RunConfiguration {
        host_version: plan.host_version.label().to_owned(),
        test_workspace: plan.test_workspace.clone(),
        extension_source: plan.extension_source.clone(),
        isolated_config_path: isolation.path().to_path_buf(),
    })
}

/// Runs `<cli> --version` once so the CLI has settled before the test launch.
fn verify_host<R: CommandRunner + ?Sized>(
    runner: &R,
    host: &HostInstallation,
) -> Result<(), AcquisitionError> {
    let cli = host.cli_path();
    let exit = runner
        .run(&HostInvocation::new(cli).arg("--version"))
        .map_err(|source| AcquisitionError::Verify {
            path: cli.to_path_buf(),
            source,
        })?;
    if exit.success() {
        info!(target: PIPELINE_TARGET, cli = %cli.display(), "host CLI verified");
    } else {
        warn!(
            target: PIPELINE_TARGET,
            cli = %cli.display(),
            %exit,
            "host CLI version probe failed"
        );
    }
    Ok(())
}

/// Default test workspace below `repository_root`.
#[must_use]
pub fn default_test_workspace(repository_root: &Path) -> PathBuf {
    repository_root
        .join("vscode-test-runner")
        .join("workspace-1")
}
