//! Bindings handed to the interpreter module on activation.

use std::fmt;
use std::sync::Arc;

use crate::host_api::HostApi;
use crate::transport::SocketTransport;

/// Activation-time bindings shared with the deferred module.
///
/// Built once by [`crate::Bootstrap::install_globals`] and shared by
/// reference for as long as the bootstrap lives.
#[derive(Clone)]
pub struct ActivationGlobals {
    transport: Option<Arc<dyn SocketTransport>>,
    host_api: Arc<dyn HostApi>,
}

impl ActivationGlobals {
    /// Bundles a resolved transport (if any) with the host API handle.
    #[must_use]
    pub fn new(transport: Option<Arc<dyn SocketTransport>>, host_api: Arc<dyn HostApi>) -> Self {
        Self {
            transport,
            host_api,
        }
    }

    /// The socket transport, absent when the optional provider was missing.
    #[must_use]
    pub fn transport(&self) -> Option<&Arc<dyn SocketTransport>> {
        self.transport.as_ref()
    }

    /// The host API handle.
    #[must_use]
    pub fn host_api(&self) -> &Arc<dyn HostApi> {
        &self.host_api
    }
}

impl fmt::Debug for ActivationGlobals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivationGlobals")
            .field("transport", &self.transport)
            .field("host_api", &"<host api>")
            .finish()
    }
}
