//! Platform and release-channel vocabulary for host builds.

use std::env::consts;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::error::AcquisitionError;

/// Release channel of a host build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Monthly stable builds.
    Stable,
    /// Nightly insiders builds.
    Insider,
}

impl Quality {
    /// Channel segment used by the update service.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stable => "stable",
            Self::Insider => "insider",
        }
    }
}

/// Requested host build, parsed from a label such as `insiders` or `1.85.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersion {
    label: String,
    release: String,
    quality: Quality,
}

impl HostVersion {
    /// Label as written by the operator; names the cache directory.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Release segment of the download URL (`latest` or an explicit version).
    #[must_use]
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Release channel.
    #[must_use]
    pub const fn quality(&self) -> Quality {
        self.quality
    }
}

impl FromStr for HostVersion {
    type Err = AcquisitionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let label = value.trim();
        if label.is_empty() {
            return Err(AcquisitionError::InvalidVersion {
                label: value.to_owned(),
            });
        }
        let (release, quality) = match label {
            "stable" => ("latest", Quality::Stable),
            "insiders" => ("latest", Quality::Insider),
            explicit => match explicit.strip_suffix("-insider") {
                Some(version) => (version, Quality::Insider),
                None => (explicit, Quality::Stable),
            },
        };
        Ok(Self {
            label: label.to_owned(),
            release: release.to_owned(),
            quality,
        })
    }
}

impl fmt::Display for HostVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// Archive container used by a platform's host builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Gzip-compressed tarball.
    TarGz,
    /// Zip archive.
    Zip,
}

impl ArchiveKind {
    /// File extension, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }
}

/// Operating system and architecture pair that host builds ship for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux on x86-64.
    LinuxX64,
    /// Linux on 64-bit ARM.
    LinuxArm64,
    /// macOS on Intel.
    DarwinX64,
    /// macOS on Apple silicon.
    DarwinArm64,
    /// Windows on x86-64.
    WindowsX64,
    /// Windows on 64-bit ARM.
    WindowsArm64,
}

impl Platform {
    /// Platform of the running harness.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::UnsupportedPlatform`] when no host build is
    /// published for this operating system and architecture.
    pub fn current() -> Result<Self, AcquisitionError> {
        Self::from_parts(consts::OS, consts::ARCH)
    }

    /// Resolves a platform from `std::env::consts` style names.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::UnsupportedPlatform`] for unknown pairs.
    pub fn from_parts(os: &str, arch: &str) -> Result<Self, AcquisitionError> {
        match (os, arch) {
            ("linux", "x86_64") => Ok(Self::LinuxX64),
            ("linux", "aarch64") => Ok(Self::LinuxArm64),
            ("macos", "x86_64") => Ok(Self::DarwinX64),
            ("macos", "aarch64") => Ok(Self::DarwinArm64),
            ("windows", "x86_64") => Ok(Self::WindowsX64),
            ("windows", "aarch64") => Ok(Self::WindowsArm64),
            _ => Err(AcquisitionError::UnsupportedPlatform {
                os: os.to_owned(),
                arch: arch.to_owned(),
            }),
        }
    }

    /// Platform segment of the download URL.
    #[must_use]
    pub const fn download_segment(self) -> &'static str {
        match self {
            Self::LinuxX64 => "linux-x64",
            Self::LinuxArm64 => "linux-arm64",
            Self::DarwinX64 => "darwin",
            Self::DarwinArm64 => "darwin-arm64",
            Self::WindowsX64 => "win32-x64-archive",
            Self::WindowsArm64 => "win32-arm64-archive",
        }
    }

    /// Archive format the update service serves for this platform.
    #[must_use]
    pub const fn archive_kind(self) -> ArchiveKind {
        match self {
            Self::LinuxX64 | Self::LinuxArm64 => ArchiveKind::TarGz,
            _ => ArchiveKind::Zip,
        }
    }

    /// Executable inside an unpacked build rooted at `install_dir`.
    #[must_use]
    pub fn executable_in(self, install_dir: &Path, quality: Quality) -> PathBuf {
        let insiders = quality == Quality::Insider;
        match self {
            Self::LinuxX64 | Self::LinuxArm64 => {
                let folder = match self {
                    Self::LinuxArm64 => "VSCode-linux-arm64",
                    _ => "VSCode-linux-x64",
                };
                install_dir.join(folder).join(linux_binary(insiders))
            }
            Self::DarwinX64 | Self::DarwinArm64 => {
                let bundle = if insiders {
                    "Visual Studio Code - Insiders.app"
                } else {
                    "Visual Studio Code.app"
                };
                install_dir
                    .join(bundle)
                    .join("Contents")
                    .join("MacOS")
                    .join("Electron")
            }
            Self::WindowsX64 | Self::WindowsArm64 => install_dir.join(if insiders {
                "Code - Insiders.exe"
            } else {
                "Code.exe"
            }),
        }
    }

    /// Command-line entry point that accompanies `executable`.
    ///
    /// The executable and the CLI are different files on every platform.
    #[must_use]
    pub fn cli_for(self, executable: &Path, quality: Quality) -> PathBuf {
        let insiders = quality == Quality::Insider;
        let parent = executable.parent().unwrap_or_else(|| Path::new(""));
        match self {
            Self::LinuxX64 | Self::LinuxArm64 => parent.join("bin").join(linux_binary(insiders)),
            Self::DarwinX64 | Self::DarwinArm64 => {
                let contents = parent.parent().unwrap_or(parent);
                contents
                    .join("Resources")
                    .join("app")
                    .join("bin")
                    .join("code")
            }
            Self::WindowsX64 | Self::WindowsArm64 => parent.join("bin").join(if insiders {
                "code-insiders.cmd"
            } else {
                "code.cmd"
            }),
        }
    }
}

const fn linux_binary(insiders: bool) -> &'static str {
    if insiders { "code-insiders" } else { "code" }
}
