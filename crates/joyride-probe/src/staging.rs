//! Temporary placement of the mock host-API package next to the bundle.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::ProbeError;

const STAGING_TARGET: &str = "joyride_probe::staging";

/// Copy of the mock package that is removed when dropped.
///
/// The guard is created before the first file is copied, so a partial copy is
/// cleaned up as well.
#[derive(Debug)]
pub struct StagedMock {
    destination: PathBuf,
}

impl StagedMock {
    /// Recursively copies `source` to `destination`.
    ///
    /// # Errors
    ///
    /// Fails when `source` is missing, when `destination` already exists, or
    /// when any entry cannot be copied.
    pub fn stage(source: &Path, destination: &Path) -> Result<Self, ProbeError> {
        if !source.is_dir() {
            return Err(ProbeError::MockSourceMissing {
                path: source.to_path_buf(),
            });
        }
        if destination.exists() {
            return Err(ProbeError::StagingConflict {
                path: destination.to_path_buf(),
            });
        }

        fs::create_dir_all(destination).map_err(|source_error| ProbeError::Stage {
            path: destination.to_path_buf(),
            source: source_error,
        })?;
        let guard = Self {
            destination: destination.to_path_buf(),
        };
        guard.copy_tree(source)?;
        debug!(
            target: STAGING_TARGET,
            from = %source.display(),
            to = %destination.display(),
            "mock host API staged"
        );
        Ok(guard)
    }

    /// Directory holding the staged copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.destination
    }

    fn copy_tree(&self, source: &Path) -> Result<(), ProbeError> {
        for walked in WalkDir::new(source).min_depth(1) {
            let entry = walked.map_err(|walk_error| ProbeError::WalkMock { source: walk_error })?;
            let Ok(relative) = entry.path().strip_prefix(source) else {
                continue;
            };
            let target = self.destination.join(relative);
            let copied = if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
            } else {
                fs::copy(entry.path(), &target).map(drop)
            };
            copied.map_err(|io_error| ProbeError::Stage {
                path: target,
                source: io_error,
            })?;
        }
        Ok(())
    }
}

impl Drop for StagedMock {
    fn drop(&mut self) {
        match fs::remove_dir_all(&self.destination) {
            Ok(()) => debug!(
                target: STAGING_TARGET,
                path = %self.destination.display(),
                "staged mock host API removed"
            ),
            Err(error) => warn!(
                target: STAGING_TARGET,
                path = %self.destination.display(),
                error = %error,
                "failed to remove staged mock host API"
            ),
        }
    }
}
