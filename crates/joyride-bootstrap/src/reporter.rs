//! Structured reporting for activation lifecycle events.

use std::sync::Arc;

use crate::error::ActivationError;
use crate::transport::TransportUnavailable;

/// Observer notified as the bootstrap moves through its phases.
pub trait ActivationReporter: Send + Sync {
    /// Invoked before any binding is installed.
    fn globals_installing(&self);

    /// Invoked when the socket transport resolved.
    fn transport_resolved(&self, name: &str);

    /// Invoked when the optional transport is unavailable.
    fn transport_missing(&self, error: &TransportUnavailable);

    /// Invoked once the host API handle is bound.
    fn host_api_bound(&self);

    /// Invoked before the deferred module is loaded.
    fn module_loading(&self);

    /// Invoked after the module activated.
    fn activated(&self);

    /// Invoked when loading or activating the module failed.
    fn activation_failed(&self, error: &ActivationError);

    /// Invoked after the module was deactivated.
    fn deactivated(&self);
}

impl<T> ActivationReporter for Arc<T>
where
    T: ActivationReporter,
{
    fn globals_installing(&self) {
        (**self).globals_installing();
    }

    fn transport_resolved(&self, name: &str) {
        (**self).transport_resolved(name);
    }

    fn transport_missing(&self, error: &TransportUnavailable) {
        (**self).transport_missing(error);
    }

    fn host_api_bound(&self) {
        (**self).host_api_bound();
    }

    fn module_loading(&self) {
        (**self).module_loading();
    }

    fn activated(&self) {
        (**self).activated();
    }

    fn activation_failed(&self, error: &ActivationError) {
        (**self).activation_failed(error);
    }

    fn deactivated(&self) {
        (**self).deactivated();
    }
}

/// Reporter that records lifecycle events with `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredActivationReporter;

impl StructuredActivationReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ActivationReporter for StructuredActivationReporter {
    fn globals_installing(&self) {
        tracing::debug!(
            target: "joyride_bootstrap::activation",
            event = "globals_installing",
            "installing activation globals"
        );
    }

    fn transport_resolved(&self, name: &str) {
        tracing::debug!(
            target: "joyride_bootstrap::activation",
            event = "transport_resolved",
            transport = name,
            "socket transport bound"
        );
    }

    fn transport_missing(&self, error: &TransportUnavailable) {
        tracing::info!(
            target: "joyride_bootstrap::activation",
            event = "transport_missing",
            provider = %error.provider,
            reason = %error.reason,
            "socket transport unavailable, continuing without it"
        );
    }

    fn host_api_bound(&self) {
        tracing::debug!(
            target: "joyride_bootstrap::activation",
            event = "host_api_bound",
            "host API bound"
        );
    }

    fn module_loading(&self) {
        tracing::debug!(
            target: "joyride_bootstrap::activation",
            event = "module_loading",
            "loading interpreter module"
        );
    }

    fn activated(&self) {
        tracing::info!(
            target: "joyride_bootstrap::activation",
            event = "activated",
            "interpreter module activated"
        );
    }

    fn activation_failed(&self, error: &ActivationError) {
        tracing::error!(
            target: "joyride_bootstrap::activation",
            event = "activation_failed",
            error = %error,
            "interpreter activation failed"
        );
    }

    fn deactivated(&self) {
        tracing::info!(
            target: "joyride_bootstrap::activation",
            event = "deactivated",
            "interpreter module deactivated"
        );
    }
}
