//! Host application acquisition.
//!
//! [`HostAcquirer`] turns a version label into a [`HostInstallation`]: either
//! a build already unpacked under the cache root, a freshly downloaded one, or
//! an operator-supplied executable. Downloads unpack into a temporary sibling
//! directory and are renamed into place once complete, so an interrupted run
//! never leaves a half-populated cache entry behind.

mod archive;
mod error;
mod platform;

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

pub use archive::{ArchiveFetcher, HttpFetcher};
pub use error::AcquisitionError;
pub use platform::{ArchiveKind, HostVersion, Platform, Quality};

const HOST_TARGET: &str = "joyride_harness::host";

/// Update service serving host build archives.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://update.code.visualstudio.com";

/// A resolved host build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInstallation {
    executable_path: PathBuf,
    cli_path: PathBuf,
    platform: Platform,
    quality: Quality,
}

impl HostInstallation {
    /// Describes a build whose executable lives at `executable_path`.
    #[must_use]
    pub fn new(executable_path: PathBuf, platform: Platform, quality: Quality) -> Self {
        let cli_path = platform.cli_for(&executable_path, quality);
        Self {
            executable_path,
            cli_path,
            platform,
            quality,
        }
    }

    /// GUI executable used to launch the test instance.
    #[must_use]
    pub fn executable_path(&self) -> &Path {
        &self.executable_path
    }

    /// Command-line entry point used for installs and verification.
    #[must_use]
    pub fn cli_path(&self) -> &Path {
        &self.cli_path
    }

    /// Platform the build targets.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Release channel of the build.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }
}

/// Profile directories handed to every host launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostProfile {
    /// Use the developer's own extensions and user-data directories.
    Machine,
    /// Use directories under the cache root.
    Isolated {
        /// Directory the host installs extensions into.
        extensions_dir: PathBuf,
        /// Directory holding host settings and state.
        user_data_dir: PathBuf,
    },
}

impl HostProfile {
    /// Isolated profile rooted at `cache_dir`.
    #[must_use]
    pub fn isolated(cache_dir: &Path) -> Self {
        Self::Isolated {
            extensions_dir: cache_dir.join("extensions"),
            user_data_dir: cache_dir.join("user-data"),
        }
    }

    /// Launch arguments selecting this profile.
    #[must_use]
    pub fn launch_arguments(&self) -> Vec<OsString> {
        match self {
            Self::Machine => Vec::new(),
            Self::Isolated {
                extensions_dir,
                user_data_dir,
            } => vec![
                flag_with_path("--extensions-dir=", extensions_dir),
                flag_with_path("--user-data-dir=", user_data_dir),
            ],
        }
    }
}

/// Concatenates a `--flag=` prefix with a path without lossy conversion.
pub(crate) fn flag_with_path(flag: &str, path: &Path) -> OsString {
    let mut argument = OsString::from(flag);
    argument.push(path.as_os_str());
    argument
}

/// Resolves host builds under a cache root.
#[derive(Debug, Clone)]
pub struct HostAcquirer<F> {
    cache_dir: PathBuf,
    platform: Platform,
    fetcher: F,
    download_base: String,
}

impl<F: ArchiveFetcher> HostAcquirer<F> {
    /// Creates an acquirer for `platform` that caches under `cache_dir`.
    #[must_use]
    pub fn new(cache_dir: PathBuf, platform: Platform, fetcher: F) -> Self {
        Self {
            cache_dir,
            platform,
            fetcher,
            download_base: DEFAULT_DOWNLOAD_BASE.to_owned(),
        }
    }

    /// Replaces the update service base URL.
    #[must_use]
    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into();
        self
    }

    /// Download URL for `version` on this platform.
    #[must_use]
    pub fn download_url(&self, version: &HostVersion) -> String {
        format!(
            "{}/{}/{}/{}",
            self.download_base.trim_end_matches('/'),
            version.release(),
            self.platform.download_segment(),
            version.quality().as_str()
        )
    }

    /// Cache directory holding the unpacked build for `version`.
    #[must_use]
    pub fn install_dir(&self, version: &HostVersion) -> PathBuf {
        self.cache_dir.join(format!(
            "vscode-{}-{}",
            self.platform.download_segment(),
            version.label()
        ))
    }

    /// Returns the cached build for `version`, downloading it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError`] when the download, unpacking or cache
    /// promotion fails, or the unpacked build lacks its executable.
    pub fn acquire(&self, version: &HostVersion) -> Result<HostInstallation, AcquisitionError> {
        let install_dir = self.install_dir(version);
        let executable = self.platform.executable_in(&install_dir, version.quality());
        if executable.is_file() {
            info!(
                target: HOST_TARGET,
                version = %version,
                path = %install_dir.display(),
                "found cached host build"
            );
            return Ok(HostInstallation::new(
                executable,
                self.platform,
                version.quality(),
            ));
        }

        self.download(version, &install_dir)?;
        if !executable.is_file() {
            return Err(AcquisitionError::ExecutableMissing { path: executable });
        }
        Ok(HostInstallation::new(
            executable,
            self.platform,
            version.quality(),
        ))
    }

    /// Adopts an operator-supplied executable without downloading anything.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::ExecutableMissing`] when the file is absent.
    pub fn locate(
        &self,
        executable: &Path,
        version: &HostVersion,
    ) -> Result<HostInstallation, AcquisitionError> {
        if !executable.is_file() {
            return Err(AcquisitionError::ExecutableMissing {
                path: executable.to_path_buf(),
            });
        }
        debug!(
            target: HOST_TARGET,
            path = %executable.display(),
            "using configured host executable"
        );
        Ok(HostInstallation::new(
            executable.to_path_buf(),
            self.platform,
            version.quality(),
        ))
    }

    fn download(
        &self,
        version: &HostVersion,
        install_dir: &Path,
    ) -> Result<(), AcquisitionError> {
        fs::create_dir_all(&self.cache_dir).map_err(cache_error(&self.cache_dir))?;
        let staging = tempfile::Builder::new()
            .prefix(".download-")
            .tempdir_in(&self.cache_dir)
            .map_err(cache_error(&self.cache_dir))?;

        let url = self.download_url(version);
        let kind = self.platform.archive_kind();
        let archive_path = staging.path().join(format!("host.{}", kind.extension()));
        info!(target: HOST_TARGET, %url, "downloading host build");
        let bytes = archive::download_to(&self.fetcher, &url, &archive_path)?;

        let unpacked = staging.path().join("unpacked");
        fs::create_dir(&unpacked).map_err(cache_error(&unpacked))?;
        archive::unpack(&archive_path, kind, &unpacked)?;

        if install_dir.exists() {
            fs::remove_dir_all(install_dir).map_err(cache_error(install_dir))?;
        }
        fs::rename(&unpacked, install_dir).map_err(cache_error(install_dir))?;
        info!(
            target: HOST_TARGET,
            bytes,
            path = %install_dir.display(),
            "host build unpacked"
        );
        Ok(())
    }
}

fn cache_error(path: &Path) -> impl FnOnce(io::Error) -> AcquisitionError {
    let owned = path.to_path_buf();
    move |source| AcquisitionError::Cache {
        path: owned,
        source,
    }
}
