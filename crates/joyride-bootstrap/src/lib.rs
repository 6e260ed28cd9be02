//! Activation bootstrap for the Joyride extension.
//!
//! When the host activates the extension, [`Bootstrap`] first installs the
//! activation bindings (an optional socket transport, then the host API
//! handle) and only afterwards loads the interpreter module, passing the
//! bindings to it as an explicit [`ActivationGlobals`] context.
//!
//! ```text
//! Uninitialized --install_globals--> GlobalsInstalled --activate--> Activated
//!                                           ^                           |
//!                                           +-------- deactivate -------+
//! ```

mod bootstrap;
mod error;
mod globals;
mod host_api;
mod module;
mod reporter;
mod transport;

#[cfg(test)]
mod tests;

pub use bootstrap::{Bootstrap, BootstrapState, activate_extension};
pub use error::ActivationError;
pub use globals::ActivationGlobals;
pub use host_api::{HostApi, InputBoxOptions, WorkspaceFolder};
pub use module::{
    ExtensionContext, FnLoader, InterpreterModule, LoadFuture, ModuleError, ModuleLoader,
};
pub use reporter::{ActivationReporter, StructuredActivationReporter};
#[cfg(feature = "socket-transport")]
pub use transport::TcpTransport;
pub use transport::{
    Connection, DefaultTransportResolver, SocketTransport, TransportResolver,
    TransportUnavailable,
};
