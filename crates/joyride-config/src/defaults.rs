use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Host channel downloaded when no version is configured.
pub const DEFAULT_HOST_VERSION: &str = "insiders";

/// Cache root for downloaded builds, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".vscode-test";

/// Extension working tree, relative to the working directory.
pub const DEFAULT_REPOSITORY_ROOT: &str = ".";

/// Extension-tests entry module, relative to the repository root.
pub const DEFAULT_EXTENSION_TESTS_PATH: &str = "vscode-test-runner/runTests";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Compact
}

/// Default host version label.
#[must_use]
pub const fn default_host_version() -> &'static str {
    DEFAULT_HOST_VERSION
}

/// Default download cache root.
#[must_use]
pub const fn default_cache_dir() -> &'static str {
    DEFAULT_CACHE_DIR
}

/// Default repository root.
#[must_use]
pub const fn default_repository_root() -> &'static str {
    DEFAULT_REPOSITORY_ROOT
}

/// Default extension-tests entry module.
#[must_use]
pub const fn default_extension_tests_path() -> &'static str {
    DEFAULT_EXTENSION_TESTS_PATH
}

// Owned variants feed the derive defaults, which need allocated values.

pub(crate) fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

pub(crate) fn default_host_version_string() -> String {
    DEFAULT_HOST_VERSION.to_owned()
}

pub(crate) fn default_cache_dir_string() -> String {
    DEFAULT_CACHE_DIR.to_owned()
}

pub(crate) fn default_repository_root_string() -> String {
    DEFAULT_REPOSITORY_ROOT.to_owned()
}

pub(crate) fn default_extension_tests_path_string() -> String {
    DEFAULT_EXTENSION_TESTS_PATH.to_owned()
}
