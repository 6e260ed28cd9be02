//! Bundle check, mock staging and the timed load sequence.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::ProbeError;
use crate::loader::BundleLoader;
use crate::staging::StagedMock;
use crate::stats::{LoadSample, LoadStatistics};

const PROBE_TARGET: &str = "joyride_probe::probe";

/// Bundle location relative to the extension directory.
pub const BUNDLE_RELATIVE_PATH: &str = "out/joyride.js";

/// Staged mock location relative to the extension directory.
pub const STAGED_MOCK_RELATIVE_PATH: &str = "out/node_modules";

/// Timed loads performed when no count is given.
pub const DEFAULT_RUNS: u32 = 10;

/// Mock host-API package staged next to the bundle by default.
pub const DEFAULT_MOCK_SOURCE: &str = "script/mock-vscode/node_modules";

/// What to measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    /// Extension directory containing the built bundle.
    pub extension_dir: PathBuf,
    /// Number of timed cold loads after the warm-up.
    pub runs: u32,
    /// Mock host-API package copied next to the bundle while loading.
    pub mock_source: PathBuf,
}

impl ProbeRequest {
    /// Absolute or relative path of the bundle.
    #[must_use]
    pub fn bundle_path(&self) -> PathBuf {
        self.extension_dir.join(BUNDLE_RELATIVE_PATH)
    }

    /// Where the mock package is staged.
    #[must_use]
    pub fn staging_path(&self) -> PathBuf {
        self.extension_dir.join(STAGED_MOCK_RELATIVE_PATH)
    }
}

/// Measurements from one probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Size of the bundle on disk.
    pub bundle_size: u64,
    /// Duration of the first, untimed-for-statistics load.
    pub warm_up: Duration,
    /// Timed cold loads in order.
    pub samples: Vec<LoadSample>,
    /// Means over `samples`.
    pub statistics: LoadStatistics,
}

impl ProbeReport {
    /// Writes the human-readable report, one measurement per line.
    ///
    /// # Errors
    ///
    /// Propagates write failures from `out`.
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "joyride.js bundle size {} bytes", self.bundle_size)?;
        writeln!(out, "initial load joyride.js {} ms", millis(self.warm_up))?;
        for sample in &self.samples {
            writeln!(out, "load joyride.js {} ms", millis(sample.duration))?;
        }
        writeln!(
            out,
            "average load time {} ms",
            millis(self.statistics.trimmed_mean)
        )?;
        writeln!(
            out,
            "raw average load time {} ms",
            millis(self.statistics.raw_mean)
        )
    }
}

/// Checks the bundle, stages the mock package and times the loads.
///
/// Nothing is staged when the bundle is missing. Once staged, the mock copy
/// is removed however the loads end.
///
/// # Errors
///
/// Returns [`ProbeError`] when the bundle is missing, staging fails or any
/// load fails.
pub fn run_probe<L: BundleLoader + ?Sized>(
    request: &ProbeRequest,
    loader: &L,
) -> Result<ProbeReport, ProbeError> {
    let bundle = request.bundle_path();
    let bundle_size = bundle_size(&bundle)?;
    info!(
        target: PROBE_TARGET,
        bundle = %bundle.display(),
        size = bundle_size,
        runs = request.runs,
        "probing bundle load time"
    );

    let staged = StagedMock::stage(&request.mock_source, &request.staging_path())?;
    let warm_up = loader.load(&bundle)?;
    debug!(target: PROBE_TARGET, elapsed = ?warm_up, "warm-up load finished");

    let mut samples = Vec::new();
    for run_index in 0..request.runs {
        let duration = loader.load(&bundle)?;
        debug!(target: PROBE_TARGET, run_index, elapsed = ?duration, "cold load finished");
        samples.push(LoadSample {
            run_index,
            duration,
        });
    }
    drop(staged);

    let statistics = LoadStatistics::from_samples(&samples);
    Ok(ProbeReport {
        bundle_size,
        warm_up,
        samples,
        statistics,
    })
}

fn bundle_size(bundle: &Path) -> Result<u64, ProbeError> {
    if !bundle.is_file() {
        return Err(ProbeError::BundleMissing {
            path: bundle.to_path_buf(),
        });
    }
    fs::metadata(bundle)
        .map(|metadata| metadata.len())
        .map_err(|source| ProbeError::BundleMetadata {
            path: bundle.to_path_buf(),
            source,
        })
}

fn millis(duration: Duration) -> String {
    let whole = duration.as_millis();
    let fraction = duration.as_micros().saturating_sub(whole.saturating_mul(1000));
    format!("{whole}.{fraction:03}")
}
