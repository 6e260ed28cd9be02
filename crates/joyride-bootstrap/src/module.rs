//! The deferred interpreter module and the loader that constructs it.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use thiserror::Error;

use crate::globals::ActivationGlobals;

/// Context the host passes to the extension on activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionContext {
    /// Directory the extension is installed in.
    pub extension_path: PathBuf,
    /// Per-workspace storage directory, when the host provides one.
    pub storage_path: Option<PathBuf>,
}

impl ExtensionContext {
    /// Context for an extension rooted at `extension_path`.
    #[must_use]
    pub fn new(extension_path: impl Into<PathBuf>) -> Self {
        Self {
            extension_path: extension_path.into(),
            storage_path: None,
        }
    }
}

/// Failure reported by a loader or by the module itself.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ModuleError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl ModuleError {
    /// Error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Error wrapping an underlying cause.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The interpreter entry point. Opaque apart from its lifecycle hooks.
#[async_trait]
pub trait InterpreterModule: Send + Sync {
    /// Activates the interpreter with the installed bindings.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError`] when the interpreter refuses to start.
    async fn activate(
        &self,
        context: &ExtensionContext,
        globals: Arc<ActivationGlobals>,
    ) -> Result<Option<serde_json::Value>, ModuleError>;

    /// Releases whatever `activate` acquired.
    fn deactivate(&self);
}

/// Constructs the interpreter module on first activation.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Loads the module.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleError`] when the module cannot be constructed.
    async fn load(&self) -> Result<Arc<dyn InterpreterModule>, ModuleError>;
}

/// Future returned by the closure wrapped in [`FnLoader`].
pub type LoadFuture = BoxFuture<'static, Result<Arc<dyn InterpreterModule>, ModuleError>>;

/// Adapts a closure returning a boxed future into a [`ModuleLoader`].
pub struct FnLoader<F> {
    load: F,
}

impl<F> FnLoader<F>
where
    F: Fn() -> LoadFuture + Send + Sync,
{
    /// Wraps `load`.
    pub const fn new(load: F) -> Self {
        Self { load }
    }
}

#[async_trait]
impl<F> ModuleLoader for FnLoader<F>
where
    F: Fn() -> LoadFuture + Send + Sync,
{
    async fn load(&self) -> Result<Arc<dyn InterpreterModule>, ModuleError> {
        (self.load)().await
    }
}
