//! Pipeline-level tests with recorded host invocations.

use std::cell::RefCell;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::command::{CommandRunner, HostExit, HostInvocation};
use crate::host::{AcquisitionError, ArchiveFetcher, HostAcquirer, Platform};
use crate::install::ExtensionSource;
use crate::isolation::{Environment, MapEnvironment, USER_CONFIG_PATH_KEY};
use crate::pipeline::{Collaborators, RunPlan, default_test_workspace, run_pipeline};


/// Exit codes returned for each kind of host invocation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ExitScript {
    pub(crate) version: Option<i32>,
    pub(crate) install: Option<i32>,
    pub(crate) tests: Option<i32>,
}

impl Default for ExitScript {
    fn default() -> Self {
        Self {
            version: Some(0),
            install: Some(0),
            tests: Some(0),
        }
    }
}

/// Records invocations and answers from an [`ExitScript`].
pub(crate) struct RecordingRunner {
    script: ExitScript,
    seen: RefCell<Vec<HostInvocation>>,
}

impl RecordingRunner {
    pub(crate) fn new(script: ExitScript) -> Self {
        Self {
            script,
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn into_invocations(self) -> Vec<HostInvocation> {
        self.seen.into_inner()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &HostInvocation) -> io::Result<HostExit> {
        self.seen.borrow_mut().push(invocation.clone());
        let code = if invocation.has_argument("--version") {
            self.script.version
        } else if invocation.has_argument("--install-extension") {
            self.script.install
        } else {
            self.script.tests
        };
        Ok(HostExit::from_code(code))
    }
}

/// Fetcher for runs that must never download.
pub(crate) struct OfflineFetcher;

impl ArchiveFetcher for OfflineFetcher {
    fn fetch(&self, url: &str, _sink: &mut dyn Write) -> Result<u64, AcquisitionError> {
        Err(AcquisitionError::Cache {
            path: PathBuf::from(url),
            source: io::Error::other("downloads are disabled in tests"),
        })
    }
}

/// Builds a plan rooted in `scratch` that uses a local host executable.
pub(crate) fn plan_in(scratch: &Path, source: ExtensionSource) -> RunPlan {
    let repository_root = scratch.join("repo");
    let host_dir = scratch.join("host");
    fs::create_dir_all(&host_dir).expect("create host dir");
    let executable = host_dir.join("code");
    fs::write(&executable, "").expect("create host executable");

    RunPlan {
        host_version: "stable".parse().expect("parse version"),
        test_workspace: default_test_workspace(&repository_root),
        extension_source: source,
        extension_tests_path: repository_root.join("vscode-test-runner/runTests"),
        cache_dir: scratch.join("cache"),
        host_executable: Some(executable),
        user_config_target: scratch.join("user-config"),
        reuse_machine_install: false,
        keep_user_config: false,
        skip_host_verification: false,
        repository_root,
    }
}

pub(crate) fn collaborators(
    environment: MapEnvironment,
    cache_dir: &Path,
    script: ExitScript,
) -> Collaborators<MapEnvironment, OfflineFetcher, RecordingRunner> {
    Collaborators {
        environment,
        acquirer: HostAcquirer::new(cache_dir.to_path_buf(), Platform::LinuxX64, OfflineFetcher),
        runner: RecordingRunner::new(script),
    }
}

#[fixture]
fn scratch() -> TempDir {
    TempDir::new().expect("create scratch dir")
}

#[rstest]
fn development_runs_verify_the_cli_first(scratch: TempDir) {
    let plan = plan_in(scratch.path(), ExtensionSource::Development);
    let mut parts = collaborators(
        MapEnvironment::default(),
        &plan.cache_dir,
        ExitScript::default(),
    );

    run_pipeline(&plan, &mut parts).expect("run pipeline");

    let seen = parts.runner.into_invocations();
    assert_eq!(seen.len(), 2);
    let probe = seen.first().expect("version probe");
    assert_eq!(probe.program(), scratch.path().join("host/bin/code"));
    assert_eq!(probe.arguments(), &[OsString::from("--version")]);
}

#[rstest]
fn skipped_verification_launches_tests_directly(scratch: TempDir) {
    let plan = RunPlan {
        skip_host_verification: true,
        ..plan_in(scratch.path(), ExtensionSource::Development)
    };
    let mut parts = collaborators(
        MapEnvironment::default(),
        &plan.cache_dir,
        ExitScript::default(),
    );

    run_pipeline(&plan, &mut parts).expect("run pipeline");

    let seen = parts.runner.into_invocations();
    assert_eq!(seen.len(), 1);
    assert!(!seen.iter().any(|invocation| invocation.has_argument("--version")));
}

#[rstest]
fn failed_version_probe_is_not_fatal(scratch: TempDir) {
    let plan = plan_in(scratch.path(), ExtensionSource::Development);
    let script = ExitScript {
        version: Some(9),
        ..ExitScript::default()
    };
    let mut parts = collaborators(MapEnvironment::default(), &plan.cache_dir, script);

    assert!(run_pipeline(&plan, &mut parts).is_ok());
}

#[rstest]
fn machine_install_reuse_drops_profile_arguments(scratch: TempDir) {
    let plan = RunPlan {
        reuse_machine_install: true,
        ..plan_in(
            scratch.path(),
            ExtensionSource::Artifact(String::from("joyride.vsix")),
        )
    };
    let mut parts = collaborators(
        MapEnvironment::default(),
        &plan.cache_dir,
        ExitScript::default(),
    );

    run_pipeline(&plan, &mut parts).expect("run pipeline");

    for invocation in parts.runner.into_invocations() {
        assert!(invocation.arguments().iter().all(|argument| {
            let text = argument.to_string_lossy();
            !text.starts_with("--extensions-dir=") && !text.starts_with("--user-data-dir=")
        }));
    }
}

#[rstest]
fn kept_user_config_survives_the_run(scratch: TempDir) {
    let plan = RunPlan {
        keep_user_config: true,
        ..plan_in(scratch.path(), ExtensionSource::Development)
    };
    let mut parts = collaborators(
        MapEnvironment::default(),
        &plan.cache_dir,
        ExitScript::default(),
    );

    let outcome = run_pipeline(&plan, &mut parts).expect("run pipeline");

    assert!(outcome.isolated_config_path.is_dir());
    assert_eq!(parts.environment, MapEnvironment::default());
}

#[rstest]
fn back_to_back_runs_share_one_environment(scratch: TempDir) {
    let plan = plan_in(scratch.path(), ExtensionSource::Development);
    let mut parts = collaborators(
        MapEnvironment::default(),
        &plan.cache_dir,
        ExitScript::default(),
    );

    let first = run_pipeline(&plan, &mut parts).expect("first run");
    assert!(!first.isolated_config_path.exists());
    assert!(parts.environment.var_os(USER_CONFIG_PATH_KEY).is_none());

    fs::create_dir_all(&plan.user_config_target).expect("recreate stale dir");
    fs::write(plan.user_config_target.join("stale.cljs"), "(old)").expect("write stale file");
    let second = run_pipeline(&plan, &mut parts).expect("second run");

    assert_eq!(second.isolated_config_path, plan.user_config_target);
    assert!(!plan.user_config_target.exists());
    assert!(parts.environment.var_os(USER_CONFIG_PATH_KEY).is_none());
}
