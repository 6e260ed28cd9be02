//! Activation failures.

use thiserror::Error;

use crate::module::ModuleError;

/// Errors surfaced as a rejected activation.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Activation was requested before the globals were installed.
    #[error("activation requested before the activation globals were installed")]
    NotReady,
    /// The module is already active.
    #[error("the interpreter module is already active")]
    AlreadyActive,
    /// The deferred module could not be loaded.
    #[error("failed to load the interpreter module: {source}")]
    Load {
        /// Loader failure.
        #[source]
        source: ModuleError,
    },
    /// The module loaded but its activation failed.
    #[error("interpreter module activation failed: {source}")]
    Module {
        /// Failure reported by the module.
        #[source]
        source: ModuleError,
    },
}
