//! Probe runs against a scripted loader.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::{BundleLoader, ProbeError, ProbeRequest, run_probe};


/// Loader returning scripted durations (repeating the last one) and
/// recording what it saw.
pub(crate) struct ScriptedLoader {
    durations: Vec<Duration>,
    fail_at: Option<usize>,
    staging_path: PathBuf,
    calls: Cell<usize>,
    staged_during_load: RefCell<Vec<bool>>,
}

impl ScriptedLoader {
    pub(crate) fn new(durations: Vec<Duration>, staging_path: PathBuf) -> Self {
        Self {
            durations,
            fail_at: None,
            staging_path,
            calls: Cell::new(0),
            staged_during_load: RefCell::new(Vec::new()),
        }
    }

    /// Fails the call with the given zero-based index.
    pub(crate) fn failing_at(mut self, call: usize) -> Self {
        self.fail_at = Some(call);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.get()
    }

    pub(crate) fn always_staged(&self) -> bool {
        self.staged_during_load.borrow().iter().all(|staged| *staged)
    }
}

impl BundleLoader for ScriptedLoader {
    fn load(&self, bundle: &Path) -> Result<Duration, ProbeError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        self.staged_during_load
            .borrow_mut()
            .push(self.staging_path.join("vscode/package.json").is_file());
        if self.fail_at == Some(call) {
            return Err(ProbeError::LoaderOutput {
                output: format!("cannot load {}", bundle.display()),
            });
        }
        let scripted = self.durations.get(call).or_else(|| self.durations.last());
        Ok(scripted.copied().unwrap_or(Duration::from_millis(1)))
    }
}

/// Extension directory with a bundle and a separate mock package.
pub(crate) struct Workspace {
    pub(crate) scratch: TempDir,
}

impl Workspace {
    pub(crate) fn new() -> Self {
        let scratch = TempDir::new().expect("create scratch dir");
        let mock = scratch.path().join("mock-vscode/node_modules/vscode");
        fs::create_dir_all(&mock).expect("create mock package");
        fs::write(mock.join("package.json"), "{}").expect("write mock manifest");
        Self { scratch }
    }

    pub(crate) fn extension_dir(&self) -> PathBuf {
        self.scratch.path().join("joyride")
    }

    pub(crate) fn write_bundle(&self, contents: &str) {
        let out = self.extension_dir().join("out");
        fs::create_dir_all(&out).expect("create out dir");
        fs::write(out.join("joyride.js"), contents).expect("write bundle");
    }

    pub(crate) fn request(&self, runs: u32) -> ProbeRequest {
        ProbeRequest {
            extension_dir: self.extension_dir(),
            runs,
            mock_source: self.scratch.path().join("mock-vscode/node_modules"),
        }
    }
}

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(10)]
fn every_requested_run_is_timed_after_one_warm_up(workspace: Workspace, #[case] runs: u32) {
    workspace.write_bundle("module.exports = {};");
    let request = workspace.request(runs);
    let loader = ScriptedLoader::new(vec![Duration::from_millis(5)], request.staging_path());

    let report = run_probe(&request, &loader).expect("probe succeeds");

    assert_eq!(report.samples.len(), usize::try_from(runs).expect("fits usize"));
    assert_eq!(loader.calls(), report.samples.len() + 1);
    assert!(
        report
            .samples
            .iter()
            .zip(0..)
            .all(|(sample, index)| sample.run_index == index)
    );
    assert!(loader.always_staged());
    assert!(!request.staging_path().exists());
}

#[rstest]
fn bundle_size_is_reported(workspace: Workspace) {
    workspace.write_bundle("0123456789");
    let request = workspace.request(1);
    let loader = ScriptedLoader::new(vec![Duration::from_millis(5)], request.staging_path());

    let report = run_probe(&request, &loader).expect("probe succeeds");

    assert_eq!(report.bundle_size, 10);
}

#[rstest]
fn warm_up_is_excluded_from_statistics(workspace: Workspace) {
    workspace.write_bundle("module.exports = {};");
    let request = workspace.request(2);
    let loader = ScriptedLoader::new(
        vec![
            Duration::from_millis(300),
            Duration::from_millis(10),
            Duration::from_millis(20),
        ],
        request.staging_path(),
    );

    let report = run_probe(&request, &loader).expect("probe succeeds");

    assert_eq!(report.warm_up, Duration::from_millis(300));
    assert_eq!(report.statistics.raw_mean, Duration::from_millis(15));
}

#[rstest]
fn missing_bundle_stages_nothing(workspace: Workspace) {
    let request = workspace.request(3);
    let loader = ScriptedLoader::new(Vec::new(), request.staging_path());

    let error = run_probe(&request, &loader).expect_err("missing bundle");

    assert!(matches!(error, ProbeError::BundleMissing { .. }));
    assert_eq!(loader.calls(), 0);
    assert!(!request.staging_path().exists());
}

#[rstest]
#[case::during_warm_up(0)]
#[case::during_timed_runs(2)]
fn loader_failure_still_removes_staged_mock(workspace: Workspace, #[case] fail_at: usize) {
    workspace.write_bundle("throw new Error('boom');");
    let request = workspace.request(4);
    let loader = ScriptedLoader::new(vec![Duration::from_millis(5)], request.staging_path())
        .failing_at(fail_at);

    let error = run_probe(&request, &loader).expect_err("loader fails");

    assert!(matches!(error, ProbeError::LoaderOutput { .. }));
    assert_eq!(loader.calls(), fail_at + 1);
    assert!(!request.staging_path().exists());
}

#[rstest]
fn occupied_staging_path_aborts_before_loading(workspace: Workspace) {
    workspace.write_bundle("module.exports = {};");
    let request = workspace.request(1);
    fs::create_dir_all(request.staging_path().join("left-over")).expect("occupy staging path");
    let loader = ScriptedLoader::new(vec![Duration::from_millis(5)], request.staging_path());

    let error = run_probe(&request, &loader).expect_err("staging conflict");

    assert!(matches!(error, ProbeError::StagingConflict { .. }));
    assert_eq!(loader.calls(), 0);
    assert!(request.staging_path().join("left-over").is_dir());
}
