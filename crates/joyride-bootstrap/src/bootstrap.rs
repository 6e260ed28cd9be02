//! Two-phase activation: install the bindings, then load the module.

use std::sync::Arc;

use strum::Display;

use crate::error::ActivationError;
use crate::globals::ActivationGlobals;
use crate::host_api::HostApi;
use crate::module::{ExtensionContext, InterpreterModule, ModuleLoader};
use crate::reporter::ActivationReporter;
use crate::transport::TransportResolver;

/// Observable bootstrap phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum BootstrapState {
    /// Nothing installed yet.
    Uninitialized,
    /// Bindings installed; the module has not been loaded.
    GlobalsInstalled,
    /// The module is loaded and active.
    Activated,
}

enum Phase {
    Uninitialized,
    GlobalsInstalled {
        globals: Arc<ActivationGlobals>,
    },
    Activated {
        globals: Arc<ActivationGlobals>,
        module: Arc<dyn InterpreterModule>,
    },
}

/// Drives extension activation for one host session.
///
/// The interpreter module is not constructed until [`Bootstrap::activate`]
/// runs, by which time the transport and host API bindings exist.
pub struct Bootstrap<L> {
    loader: L,
    reporter: Arc<dyn ActivationReporter>,
    phase: Phase,
}

impl<L> Bootstrap<L>
where
    L: ModuleLoader,
{
    /// Creates an uninitialised bootstrap around `loader`.
    pub const fn new(loader: L, reporter: Arc<dyn ActivationReporter>) -> Self {
        Self {
            loader,
            reporter,
            phase: Phase::Uninitialized,
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn state(&self) -> BootstrapState {
        match self.phase {
            Phase::Uninitialized => BootstrapState::Uninitialized,
            Phase::GlobalsInstalled { .. } => BootstrapState::GlobalsInstalled,
            Phase::Activated { .. } => BootstrapState::Activated,
        }
    }

    /// Installed bindings, once [`Bootstrap::install_globals`] has run.
    #[must_use]
    pub const fn globals(&self) -> Option<&Arc<ActivationGlobals>> {
        match &self.phase {
            Phase::Uninitialized => None,
            Phase::GlobalsInstalled { globals } | Phase::Activated { globals, .. } => {
                Some(globals)
            }
        }
    }

    /// Installs the socket transport, then the host API handle.
    ///
    /// A missing transport is reported and tolerated. Calling this again
    /// after the first installation returns the existing bindings untouched.
    pub fn install_globals(
        &mut self,
        resolver: &dyn TransportResolver,
        host_api: Arc<dyn HostApi>,
    ) -> Arc<ActivationGlobals> {
        if let Some(installed) = self.globals() {
            return Arc::clone(installed);
        }

        self.reporter.globals_installing();
        let transport = match resolver.resolve() {
            Ok(resolved) => {
                self.reporter.transport_resolved(resolved.name());
                Some(resolved)
            }
            Err(unavailable) => {
                self.reporter.transport_missing(&unavailable);
                None
            }
        };
        let globals = Arc::new(ActivationGlobals::new(transport, host_api));
        self.reporter.host_api_bound();

        self.phase = Phase::GlobalsInstalled {
            globals: Arc::clone(&globals),
        };
        globals
    }

    /// Loads the deferred module and activates it.
    ///
    /// On failure the bootstrap stays in
    /// [`BootstrapState::GlobalsInstalled`] so activation can be retried.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::NotReady`] before the globals are
    /// installed, [`ActivationError::AlreadyActive`] when the module is
    /// already running, and the load or module failure otherwise.
    pub async fn activate(
        &mut self,
        context: &ExtensionContext,
    ) -> Result<Option<serde_json::Value>, ActivationError> {
        let globals = match &self.phase {
            Phase::Uninitialized => return Err(ActivationError::NotReady),
            Phase::Activated { .. } => return Err(ActivationError::AlreadyActive),
            Phase::GlobalsInstalled { globals } => Arc::clone(globals),
        };

        self.reporter.module_loading();
        let module = match self.loader.load().await {
            Ok(module) => module,
            Err(source) => {
                let error = ActivationError::Load { source };
                self.reporter.activation_failed(&error);
                return Err(error);
            }
        };

        match module.activate(context, Arc::clone(&globals)).await {
            Ok(value) => {
                self.phase = Phase::Activated { globals, module };
                self.reporter.activated();
                Ok(value)
            }
            Err(source) => {
                let error = ActivationError::Module { source };
                self.reporter.activation_failed(&error);
                Err(error)
            }
        }
    }

    /// Deactivates the module if it is active.
    ///
    /// Returns `false` without side effects when activation never completed.
    pub fn deactivate(&mut self) -> bool {
        let Phase::Activated { globals, module } = &self.phase else {
            return false;
        };
        module.deactivate();
        let retained = Arc::clone(globals);
        self.phase = Phase::GlobalsInstalled { globals: retained };
        self.reporter.deactivated();
        true
    }
}

/// Installs the globals and activates the module in one step.
///
/// # Errors
///
/// Propagates any [`ActivationError`] from [`Bootstrap::activate`].
pub async fn activate_extension<L>(
    bootstrap: &mut Bootstrap<L>,
    resolver: &dyn TransportResolver,
    host_api: Arc<dyn HostApi>,
    context: &ExtensionContext,
) -> Result<Option<serde_json::Value>, ActivationError>
where
    L: ModuleLoader,
{
    bootstrap.install_globals(resolver, host_api);
    bootstrap.activate(context).await
}
