//! Optional socket transport used by the interpreter's REPL server.
//!
//! The transport is an optional dependency: when no implementation is
//! available, activation continues without one and the module sees `None` in
//! [`crate::ActivationGlobals::transport`].

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::Arc;

use thiserror::Error;

/// A bidirectional byte stream opened by a [`SocketTransport`].
pub trait Connection: Read + Write + Send {}

impl<T: Read + Write + Send> Connection for T {}

/// Opens client connections for the interpreter.
pub trait SocketTransport: Send + Sync + fmt::Debug {
    /// Short identifier of the implementation, used in logs.
    fn name(&self) -> &str;

    /// Connects to `address` (`host:port`).
    ///
    /// # Errors
    ///
    /// Returns the I/O error reported while connecting.
    fn connect(&self, address: &str) -> io::Result<Box<dyn Connection>>;
}

/// The optional transport provider could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("socket transport '{provider}' is unavailable: {reason}")]
pub struct TransportUnavailable {
    /// Provider that was requested.
    pub provider: String,
    /// Why the provider could not be used.
    pub reason: String,
}

impl TransportUnavailable {
    /// Builds the error for `provider`.
    #[must_use]
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

/// Locates the socket transport implementation at activation time.
pub trait TransportResolver: Send + Sync {
    /// Returns the transport, or why it is unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`TransportUnavailable`] when no implementation can be used.
    fn resolve(&self) -> Result<Arc<dyn SocketTransport>, TransportUnavailable>;
}

impl<F> TransportResolver for F
where
    F: Fn() -> Result<Arc<dyn SocketTransport>, TransportUnavailable> + Send + Sync,
{
    fn resolve(&self) -> Result<Arc<dyn SocketTransport>, TransportUnavailable> {
        self()
    }
}

/// Resolver for the transport compiled into this build.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTransportResolver;

impl TransportResolver for DefaultTransportResolver {
    #[cfg(feature = "socket-transport")]
    fn resolve(&self) -> Result<Arc<dyn SocketTransport>, TransportUnavailable> {
        Ok(Arc::new(TcpTransport))
    }

    #[cfg(not(feature = "socket-transport"))]
    fn resolve(&self) -> Result<Arc<dyn SocketTransport>, TransportUnavailable> {
        Err(TransportUnavailable::new(
            "tcp",
            "built without the socket-transport feature",
        ))
    }
}

/// Plain TCP transport.
#[cfg(feature = "socket-transport")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpTransport;

#[cfg(feature = "socket-transport")]
impl SocketTransport for TcpTransport {
    fn name(&self) -> &str {
        "tcp"
    }

    fn connect(&self, address: &str) -> io::Result<Box<dyn Connection>> {
        let stream = std::net::TcpStream::connect(address)?;
        stream.set_nodelay(true)?;
        Ok(Box::new(stream))
    }
}
