//! Activation state-machine tests with recording collaborators.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::FutureExt;
use rstest::{fixture, rstest};
use serde_json::json;

use crate::{
    ActivationError, ActivationGlobals, ActivationReporter, Bootstrap, BootstrapState, Connection,
    ExtensionContext, FnLoader, HostApi, InputBoxOptions, InterpreterModule, ModuleError,
    ModuleLoader, SocketTransport, TransportUnavailable, WorkspaceFolder, activate_extension,
};


// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Reporter that records event names in order.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    events: Mutex<Vec<&'static str>>,
}

impl RecordingReporter {
    fn push(&self, event: &'static str) {
        self.events.lock().expect("reporter lock").push(event);
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.events.lock().expect("reporter lock").clone()
    }
}

impl ActivationReporter for RecordingReporter {
    fn globals_installing(&self) {
        self.push("globals_installing");
    }

    fn transport_resolved(&self, _name: &str) {
        self.push("transport_resolved");
    }

    fn transport_missing(&self, _error: &TransportUnavailable) {
        self.push("transport_missing");
    }

    fn host_api_bound(&self) {
        self.push("host_api_bound");
    }

    fn module_loading(&self) {
        self.push("module_loading");
    }

    fn activated(&self) {
        self.push("activated");
    }

    fn activation_failed(&self, _error: &ActivationError) {
        self.push("activation_failed");
    }

    fn deactivated(&self) {
        self.push("deactivated");
    }
}

pub(crate) struct FakeHostApi;

#[async_trait]
impl HostApi for FakeHostApi {
    async fn show_information_message(&self, _message: &str, items: &[String]) -> Option<String> {
        items.first().cloned()
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Option<String> {
        options.value
    }

    fn workspace_folders(&self) -> Vec<WorkspaceFolder> {
        vec![WorkspaceFolder {
            name: String::from("workspace-1"),
            uri: String::from("file:///tmp/workspace-1"),
        }]
    }
}

#[derive(Debug)]
pub(crate) struct FakeTransport;

impl SocketTransport for FakeTransport {
    fn name(&self) -> &str {
        "fake"
    }

    fn connect(&self, address: &str) -> io::Result<Box<dyn Connection>> {
        Err(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("fake transport does not connect to {address}"),
        ))
    }
}

pub(crate) fn present_transport() -> Result<Arc<dyn SocketTransport>, TransportUnavailable> {
    Ok(Arc::new(FakeTransport))
}

pub(crate) fn missing_transport() -> Result<Arc<dyn SocketTransport>, TransportUnavailable> {
    Err(TransportUnavailable::new("fake", "not installed"))
}

/// Interpreter stand-in that reports whether it saw a transport.
#[derive(Default)]
pub(crate) struct StubModule {
    fail: AtomicBool,
    activations: AtomicUsize,
    deactivations: AtomicUsize,
    saw_host_api: AtomicBool,
}

impl StubModule {
    pub(crate) fn activations(&self) -> usize {
        self.activations.load(Ordering::SeqCst)
    }

    pub(crate) fn deactivations(&self) -> usize {
        self.deactivations.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_activation(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl InterpreterModule for StubModule {
    async fn activate(
        &self,
        context: &ExtensionContext,
        globals: Arc<ActivationGlobals>,
    ) -> Result<Option<serde_json::Value>, ModuleError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModuleError::new("interpreter refused to start"));
        }
        self.activations.fetch_add(1, Ordering::SeqCst);
        let folders = globals.host_api().workspace_folders();
        self.saw_host_api.store(!folders.is_empty(), Ordering::SeqCst);
        Ok(Some(json!({
            "extension": context.extension_path.display().to_string(),
            "transport": globals.transport().map(|transport| transport.name().to_owned()),
        })))
    }

    fn deactivate(&self) {
        self.deactivations.fetch_add(1, Ordering::SeqCst);
    }
}

/// Loader that counts constructions and can be told to fail.
#[derive(Clone, Default)]
pub(crate) struct CountingLoader {
    module: Arc<StubModule>,
    loads: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl CountingLoader {
    pub(crate) fn module(&self) -> &Arc<StubModule> {
        &self.module
    }

    pub(crate) fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_loads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModuleLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn InterpreterModule>, ModuleError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ModuleError::with_source(
                "interpreter bundle missing",
                io::Error::new(io::ErrorKind::NotFound, "out/joyride.js"),
            ));
        }
        Ok(Arc::clone(&self.module) as Arc<dyn InterpreterModule>)
    }
}

pub(crate) fn context() -> ExtensionContext {
    ExtensionContext::new("/extensions/joyride")
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

struct Harness {
    loader: CountingLoader,
    reporter: Arc<RecordingReporter>,
    bootstrap: Bootstrap<CountingLoader>,
}

#[fixture]
fn harness() -> Harness {
    let loader = CountingLoader::default();
    let reporter = Arc::new(RecordingReporter::default());
    let bootstrap = Bootstrap::new(loader.clone(), Arc::clone(&reporter) as _);
    Harness {
        loader,
        reporter,
        bootstrap,
    }
}

#[rstest]
#[tokio::test]
async fn bindings_are_installed_before_the_module_loads(mut harness: Harness) {
    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    assert_eq!(harness.loader.loads(), 0);

    let value = harness
        .bootstrap
        .activate(&context())
        .await
        .expect("activation succeeds");

    assert_eq!(
        harness.reporter.events(),
        vec![
            "globals_installing",
            "transport_resolved",
            "host_api_bound",
            "module_loading",
            "activated",
        ]
    );
    assert_eq!(
        value,
        Some(json!({"extension": "/extensions/joyride", "transport": "fake"}))
    );
    assert!(harness.loader.module().saw_host_api.load(Ordering::SeqCst));
    assert_eq!(harness.bootstrap.state(), BootstrapState::Activated);
}

#[rstest]
#[tokio::test]
async fn missing_transport_is_tolerated(mut harness: Harness) {
    let globals = harness
        .bootstrap
        .install_globals(&missing_transport, Arc::new(FakeHostApi));
    assert!(globals.transport().is_none());
    assert_eq!(harness.bootstrap.state(), BootstrapState::GlobalsInstalled);

    let value = harness
        .bootstrap
        .activate(&context())
        .await
        .expect("activation succeeds without a transport");

    assert_eq!(
        value,
        Some(json!({"extension": "/extensions/joyride", "transport": null}))
    );
    assert_eq!(
        harness.reporter.events().get(1),
        Some(&"transport_missing")
    );
}

#[rstest]
#[tokio::test]
async fn activation_before_installation_is_rejected(mut harness: Harness) {
    let error = harness
        .bootstrap
        .activate(&context())
        .await
        .expect_err("activation must wait for the globals");

    assert!(matches!(error, ActivationError::NotReady));
    assert_eq!(harness.loader.loads(), 0);
    assert_eq!(harness.bootstrap.state(), BootstrapState::Uninitialized);
}

#[rstest]
#[tokio::test]
async fn failed_load_keeps_globals_and_allows_retry(mut harness: Harness) {
    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    harness.loader.fail_loads(true);

    let error = harness
        .bootstrap
        .activate(&context())
        .await
        .expect_err("load failure rejects activation");
    assert!(matches!(error, ActivationError::Load { .. }));
    assert_eq!(harness.bootstrap.state(), BootstrapState::GlobalsInstalled);

    harness.loader.fail_loads(false);
    harness
        .bootstrap
        .activate(&context())
        .await
        .expect("retry succeeds");
    assert_eq!(harness.loader.loads(), 2);
    assert_eq!(harness.bootstrap.state(), BootstrapState::Activated);
}

#[rstest]
#[tokio::test]
async fn module_failure_is_reported_as_module_error(mut harness: Harness) {
    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    harness.loader.module().fail_activation();

    let error = harness
        .bootstrap
        .activate(&context())
        .await
        .expect_err("module failure rejects activation");

    assert!(matches!(error, ActivationError::Module { .. }));
    assert_eq!(
        error.to_string(),
        "interpreter module activation failed: interpreter refused to start"
    );
    assert_eq!(harness.reporter.events().last(), Some(&"activation_failed"));
    assert_eq!(harness.bootstrap.state(), BootstrapState::GlobalsInstalled);
}

#[rstest]
#[tokio::test]
async fn second_activation_is_rejected(mut harness: Harness) {
    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    harness
        .bootstrap
        .activate(&context())
        .await
        .expect("first activation succeeds");

    let error = harness
        .bootstrap
        .activate(&context())
        .await
        .expect_err("second activation is rejected");

    assert!(matches!(error, ActivationError::AlreadyActive));
    assert_eq!(harness.loader.loads(), 1);
}

#[rstest]
fn deactivation_without_activation_is_a_no_op(mut harness: Harness) {
    assert!(!harness.bootstrap.deactivate());

    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    assert!(!harness.bootstrap.deactivate());
    assert_eq!(harness.loader.module().deactivations(), 0);
    assert!(!harness.reporter.events().contains(&"deactivated"));
}

#[rstest]
#[tokio::test]
async fn deactivation_returns_to_installed_globals(mut harness: Harness) {
    harness
        .bootstrap
        .install_globals(&present_transport, Arc::new(FakeHostApi));
    harness
        .bootstrap
        .activate(&context())
        .await
        .expect("activation succeeds");

    assert!(harness.bootstrap.deactivate());

    assert_eq!(harness.loader.module().deactivations(), 1);
    assert_eq!(harness.bootstrap.state(), BootstrapState::GlobalsInstalled);
    assert!(harness.bootstrap.globals().is_some());
}

#[rstest]
fn installing_twice_keeps_the_first_bindings(mut harness: Harness) {
    let resolutions = AtomicUsize::new(0);
    let counting_resolver = || {
        resolutions.fetch_add(1, Ordering::SeqCst);
        present_transport()
    };

    let first = harness
        .bootstrap
        .install_globals(&counting_resolver, Arc::new(FakeHostApi));
    let second = harness
        .bootstrap
        .install_globals(&counting_resolver, Arc::new(FakeHostApi));

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(resolutions.load(Ordering::SeqCst), 1);
}

#[rstest]
#[tokio::test]
async fn activate_extension_runs_both_phases(mut harness: Harness) {
    activate_extension(
        &mut harness.bootstrap,
        &missing_transport,
        Arc::new(FakeHostApi),
        &context(),
    )
    .await
    .expect("activation succeeds");

    assert_eq!(harness.loader.module().activations(), 1);
    assert_eq!(harness.bootstrap.state(), BootstrapState::Activated);
}

#[tokio::test]
async fn closure_loader_defers_construction() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructed);
    let loader = FnLoader::new(move || {
        let constructions = Arc::clone(&counter);
        async move {
            constructions.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ModuleError>(Arc::new(StubModule::default()) as Arc<dyn InterpreterModule>)
        }
        .boxed()
    });
    let mut bootstrap = Bootstrap::new(loader, Arc::new(RecordingReporter::default()) as _);

    bootstrap.install_globals(&present_transport, Arc::new(FakeHostApi));
    assert_eq!(constructed.load(Ordering::SeqCst), 0);

    bootstrap
        .activate(&context())
        .await
        .expect("activation succeeds");
    assert_eq!(constructed.load(Ordering::SeqCst), 1);
}

#[test]
fn state_names_are_snake_case() {
    assert_eq!(BootstrapState::GlobalsInstalled.to_string(), "globals_installed");
}
