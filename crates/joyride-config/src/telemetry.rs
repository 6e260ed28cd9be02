//! Stderr telemetry shared by `joyride-test` and `bundle-load-check`.
//!
//! Library crates in the workspace only emit `tracing` events; the binaries
//! call [`initialise`] once after configuration has loaded.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{Config, LogFormat};

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Outcome of [`initialise`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
    fresh: bool,
}

impl TelemetryHandle {
    /// Format of the subscriber that is installed process-wide.
    ///
    /// After the first call this is the first caller's format, whatever later
    /// configurations ask for.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// Whether this call installed the subscriber.
    #[must_use]
    pub const fn installed_by_this_call(&self) -> bool {
        self.fresh
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The configured log filter expression is malformed.
    #[error("invalid log filter '{expression}': {source}")]
    Filter {
        /// Expression as configured.
        expression: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// Another subscriber was already installed outside this crate.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the stderr subscriber described by `config`.
///
/// Only the first call per process installs anything; later calls report the
/// subscriber already in place.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is malformed or a foreign global
/// subscriber is already registered.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let mut fresh = false;
    let format = INSTALLED.get_or_try_init(|| {
        install_subscriber(config.log_filter(), config.log_format())?;
        fresh = true;
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    Ok(TelemetryHandle {
        format: *format,
        fresh,
    })
}

fn install_subscriber(expression: &str, format: LogFormat) -> Result<(), TelemetryError> {
    let subscriber = build_subscriber(expression, format)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn build_subscriber(
    expression: &str,
    format: LogFormat,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(expression).map_err(|source| TelemetryError::Filter {
        expression: expression.to_owned(),
        source,
    })?;
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!format.is_structured() && io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339())
        .with_target(true);

    Ok(match format {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
