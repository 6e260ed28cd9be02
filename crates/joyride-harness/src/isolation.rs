//! Disposable user-configuration directory for test runs.
//!
//! The extension reads its user scripts from the directory named by
//! [`USER_CONFIG_PATH_KEY`]. Before any host process starts, the harness
//! either honours a caller-provided value untouched or provisions a fresh
//! directory and exports its path so spawned hosts inherit it.

use std::collections::HashMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

const ISOLATION_TARGET: &str = "joyride_harness::isolation";

/// Environment variable naming the isolated user-configuration directory.
pub const USER_CONFIG_PATH_KEY: &str = "VSCODE_JOYRIDE_USER_CONFIG_PATH";

/// Read/write access to environment variables.
///
/// The process implementation mutates the real environment; tests use
/// [`MapEnvironment`] so scenarios never race on global state.
pub trait Environment {
    /// Returns the value of `key`, if set.
    fn var_os(&self, key: &str) -> Option<OsString>;

    /// Sets `key` to `value` for this process and its future children.
    fn set_var(&mut self, key: &str, value: &OsStr);

    /// Unsets `key`.
    fn remove_var(&mut self, key: &str);
}

/// Environment backed by the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var_os(&self, key: &str) -> Option<OsString> {
        env::var_os(key)
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        // SAFETY: the harness is single-threaded while the pipeline runs and
        // sets the variable before spawning any host process.
        unsafe { env::set_var(key, value) };
    }

    fn remove_var(&mut self, key: &str) {
        // SAFETY: called from guard teardown after every host process exited.
        unsafe { env::remove_var(key) };
    }
}

/// In-memory environment used by tests and embedding callers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MapEnvironment {
    values: HashMap<String, OsString>,
}

impl MapEnvironment {
    /// Creates an environment pre-populated with `values`.
    #[must_use]
    pub fn with_values<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<OsString>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var_os(&self, key: &str) -> Option<OsString> {
        self.values.get(key).cloned()
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove_var(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// Failures raised while provisioning the isolated directory.
#[derive(Debug, Error)]
pub enum IsolationError {
    /// A stale directory from an earlier run could not be removed.
    #[error("failed to remove stale user config directory '{path}': {source}")]
    RemoveStale {
        /// Directory that could not be removed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The fresh directory could not be created.
    #[error("failed to create user config directory '{path}': {source}")]
    Create {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}

/// Default location of the provisioned directory.
#[must_use]
pub fn default_user_config_path() -> PathBuf {
    env::temp_dir()
        .join("vscode-test-runner-joyride")
        .join("user-config")
}

/// How the isolated directory came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The caller exported the variable before the harness started.
    Preset,
    /// This run created the directory and exported the variable.
    Provisioned,
}

/// Guard over the isolated user-configuration directory.
///
/// A guard for a directory this run provisioned borrows the environment it
/// exported into. Dropping it unsets [`USER_CONFIG_PATH_KEY`] again and removes
/// the directory unless the caller asked to keep it, so the next run
/// provisions afresh. Preset directories and variables are never touched.
pub struct IsolatedUserConfig<'env> {
    path: PathBuf,
    provenance: Provenance,
    keep: bool,
    environment: &'env mut dyn Environment,
}

impl<'env> IsolatedUserConfig<'env> {
    /// Ensures [`USER_CONFIG_PATH_KEY`] names an isolated directory.
    ///
    /// When the variable is already set its value is adopted as-is without any
    /// filesystem access. Otherwise `target` is wiped, recreated empty and
    /// exported for as long as the guard lives.
    ///
    /// # Errors
    ///
    /// Returns [`IsolationError`] when the stale directory cannot be removed or
    /// the fresh one cannot be created.
    pub fn provision(
        environment: &'env mut dyn Environment,
        target: &Path,
        keep: bool,
    ) -> Result<Self, IsolationError> {
        if let Some(existing) = environment.var_os(USER_CONFIG_PATH_KEY) {
            let path = PathBuf::from(existing);
            debug!(
                target: ISOLATION_TARGET,
                path = %path.display(),
                "user config path preset by caller"
            );
            return Ok(Self {
                path,
                provenance: Provenance::Preset,
                keep: true,
                environment,
            });
        }

        reset_directory(target)?;
        environment.set_var(USER_CONFIG_PATH_KEY, target.as_os_str());
        info!(
            target: ISOLATION_TARGET,
            path = %target.display(),
            "VSCODE_JOYRIDE_USER_CONFIG_PATH set"
        );
        Ok(Self {
            path: target.to_path_buf(),
            provenance: Provenance::Provisioned,
            keep,
            environment,
        })
    }

    /// Directory the host will read user configuration from.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Whether this run provisioned the directory.
    #[must_use]
    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }
}

impl fmt::Debug for IsolatedUserConfig<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("IsolatedUserConfig")
            .field("path", &self.path)
            .field("provenance", &self.provenance)
            .field("keep", &self.keep)
            .finish_non_exhaustive()
    }
}

impl Drop for IsolatedUserConfig<'_> {
    fn drop(&mut self) {
        if self.provenance == Provenance::Preset {
            return;
        }
        // Provisioning only happens when the variable was unset.
        self.environment.remove_var(USER_CONFIG_PATH_KEY);
        debug!(target: ISOLATION_TARGET, "VSCODE_JOYRIDE_USER_CONFIG_PATH unset");
        if self.keep {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(
                target: ISOLATION_TARGET,
                path = %self.path.display(),
                "removed isolated user config"
            ),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => warn!(
                target: ISOLATION_TARGET,
                path = %self.path.display(),
                %error,
                "failed to remove isolated user config"
            ),
        }
    }
}

fn reset_directory(target: &Path) -> Result<(), IsolationError> {
    match fs::remove_dir_all(target) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(IsolationError::RemoveStale {
                path: target.to_path_buf(),
                source,
            });
        }
    }
    fs::create_dir_all(target).map_err(|source| IsolationError::Create {
        path: target.to_path_buf(),
        source,
    })
}
