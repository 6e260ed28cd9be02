//! Shared configuration for the Joyride test harness and diagnostics.
//!
//! Both binaries in the workspace (`joyride-test` and `bundle-load-check`)
//! resolve their settings through [`Config`], which layers built-in defaults,
//! an optional configuration file, `JOYRIDE_*` environment variables, and
//! command-line flags via `ortho_config`. The crate also owns the telemetry
//! installation so every binary logs with the same format and filter rules.

use std::path::Path;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod arguments;
mod defaults;
mod logging;
pub mod telemetry;

pub use arguments::{CONFIG_CLI_FLAGS, ConfigArgumentSplit, split_config_arguments};
pub use defaults::{
    DEFAULT_CACHE_DIR, DEFAULT_EXTENSION_TESTS_PATH, DEFAULT_HOST_VERSION, DEFAULT_LOG_FILTER,
    DEFAULT_REPOSITORY_ROOT, default_cache_dir, default_extension_tests_path,
    default_host_version, default_log_filter, default_log_format, default_repository_root,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use telemetry::{TelemetryError, TelemetryHandle};

/// Layered configuration shared by the harness binaries.
///
/// Values resolve with increasing precedence from defaults, the file named by
/// `--config-path` (or `JOYRIDE_CONFIG_PATH`), `JOYRIDE_*` environment
/// variables, and finally command-line flags.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "JOYRIDE")]
pub struct Config {
    /// `tracing` filter expression applied to the stderr subscriber.
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Output format for log records.
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
    /// Host build to acquire: `stable`, `insiders`, or an explicit version.
    #[ortho_config(default = defaults::default_host_version_string())]
    pub host_version: String,
    /// Directory caching downloaded host builds and isolated profiles.
    #[ortho_config(default = defaults::default_cache_dir_string())]
    pub cache_dir: String,
    /// Local host executable that replaces the download step when set.
    pub host_executable: Option<String>,
    /// Root of the extension working tree.
    #[ortho_config(default = defaults::default_repository_root_string())]
    pub repository_root: String,
    /// Extension-tests entry module, relative to the repository root.
    #[ortho_config(default = defaults::default_extension_tests_path_string())]
    pub extension_tests_path: String,
    /// Launches the host with the developer's own profile directories.
    #[ortho_config(default = false)]
    pub reuse_machine_install: bool,
    /// Leaves the provisioned user-config directory in place after the run.
    #[ortho_config(default = false)]
    pub keep_user_config: bool,
    /// Skips the `--version` probe of the host CLI before development runs.
    #[ortho_config(default = false)]
    pub skip_host_verification: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: defaults::default_log_filter_string(),
            log_format: defaults::default_log_format(),
            host_version: defaults::default_host_version_string(),
            cache_dir: defaults::default_cache_dir_string(),
            host_executable: None,
            repository_root: defaults::default_repository_root_string(),
            extension_tests_path: defaults::default_extension_tests_path_string(),
            reuse_machine_install: false,
            keep_user_config: false,
            skip_host_verification: false,
        }
    }
}

impl Config {
    /// Filter expression used when installing telemetry.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log record format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Requested host version label.
    #[must_use]
    pub fn host_version(&self) -> &str {
        self.host_version.as_str()
    }

    /// Cache root for host builds and isolated profiles.
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        Path::new(&self.cache_dir)
    }

    /// Explicit host executable, when configured.
    #[must_use]
    pub fn host_executable(&self) -> Option<&Path> {
        self.host_executable.as_deref().map(Path::new)
    }

    /// Extension working tree root.
    #[must_use]
    pub fn repository_root(&self) -> &Path {
        Path::new(&self.repository_root)
    }

    /// Extension-tests entry module as configured (may be relative).
    #[must_use]
    pub fn extension_tests_path(&self) -> &Path {
        Path::new(&self.extension_tests_path)
    }

    /// Whether the host should run against the machine-wide profile.
    #[must_use]
    pub const fn reuse_machine_install(&self) -> bool {
        self.reuse_machine_install
    }

    /// Whether the provisioned user-config directory survives teardown.
    #[must_use]
    pub const fn keep_user_config(&self) -> bool {
        self.keep_user_config
    }

    /// Whether the pre-launch `--version` probe is disabled.
    #[must_use]
    pub const fn skip_host_verification(&self) -> bool {
        self.skip_host_verification
    }
}
