//! Times a single cold load of the bundle.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::ProbeError;

/// Loads the bundle once from a clean module cache and reports how long the
/// load itself took.
pub trait BundleLoader {
    /// Loads `bundle` and returns the elapsed time.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] when the load cannot be performed or fails.
    fn load(&self, bundle: &Path) -> Result<Duration, ProbeError>;
}

impl<T: BundleLoader + ?Sized> BundleLoader for &T {
    fn load(&self, bundle: &Path) -> Result<Duration, ProbeError> {
        (**self).load(bundle)
    }
}

// Prints the nanoseconds spent in `require`. The process exits straight after,
// so its module cache never outlives the load.
const LOAD_SCRIPT: &str = "\
const path = require('path');\
const { performance } = require('perf_hooks');\
const bundle = path.resolve(process.argv[1]);\
const start = performance.now();\
require(bundle);\
const elapsed = performance.now() - start;\
process.stdout.write(String(Math.round(elapsed * 1e6)));\
process.exit(0);";

/// Loads the bundle in a fresh Node.js process per call.
///
/// Each process starts with an empty module cache, so every load is cold.
#[derive(Debug, Clone)]
pub struct NodeBundleLoader {
    program: OsString,
}

impl NodeBundleLoader {
    /// Uses `program` as the Node.js executable.
    #[must_use]
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
        }
    }
}

impl Default for NodeBundleLoader {
    fn default() -> Self {
        Self::new("node")
    }
}

impl BundleLoader for NodeBundleLoader {
    fn load(&self, bundle: &Path) -> Result<Duration, ProbeError> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(LOAD_SCRIPT)
            .arg(bundle)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| ProbeError::LoaderSpawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(ProbeError::LoaderFailed {
                bundle: bundle.to_path_buf(),
                status: output.status,
            });
        }
        parse_nanos(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_nanos(raw: &str) -> Result<Duration, ProbeError> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .map(Duration::from_nanos)
        .map_err(|_| ProbeError::LoaderOutput {
            output: trimmed.to_owned(),
        })
}
