//! Command-line surface of `joyride-test`.

use std::path::{self, Path, PathBuf};

use clap::Parser;
use joyride_config::Config;

use crate::errors::AppError;
use crate::install::{DEVELOPMENT_SENTINEL, ExtensionSource};
use crate::isolation::default_user_config_path;
use crate::pipeline::{RunPlan, default_test_workspace};

/// Runs the extension's integration tests in an isolated host instance.
///
/// Configuration flags such as `--host-version`, `--cache-dir` or
/// `--log-filter` may appear anywhere on the command line.
#[derive(Parser, Debug)]
#[command(name = "joyride-test", version)]
pub(crate) struct Cli {
    /// Packaged extension to install, or `extension-development` to load the
    /// working tree directly.
    #[arg(long, value_name = "PATH_OR_LABEL", default_value = DEVELOPMENT_SENTINEL)]
    pub(crate) joyride_vsix: String,
    /// Workspace folder opened by the test instance.
    #[arg(long, value_name = "PATH")]
    pub(crate) test_workspace: Option<PathBuf>,
}

/// Resolves arguments and configuration into an absolute run plan.
pub(crate) fn plan_run(cli: Cli, config: &Config) -> Result<RunPlan, AppError> {
    let repository_root = absolute(config.repository_root())?;
    let test_workspace = match cli.test_workspace {
        Some(workspace) => absolute(&workspace)?,
        None => default_test_workspace(&repository_root),
    };
    let Ok(extension_source) = cli.joyride_vsix.parse::<ExtensionSource>();

    Ok(RunPlan {
        host_version: config.host_version().parse()?,
        extension_tests_path: repository_root.join(config.extension_tests_path()),
        cache_dir: absolute(config.cache_dir())?,
        host_executable: config.host_executable().map(absolute).transpose()?,
        user_config_target: default_user_config_path(),
        reuse_machine_install: config.reuse_machine_install(),
        keep_user_config: config.keep_user_config(),
        skip_host_verification: config.skip_host_verification(),
        test_workspace,
        extension_source,
        repository_root,
    })
}

fn absolute(path: &Path) -> Result<PathBuf, AppError> {
    path::absolute(path).map_err(|source| AppError::ResolvePath {
        path: path.to_path_buf(),
        source,
    })
}
