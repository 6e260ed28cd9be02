//! Averages over cold-load samples.

use std::time::Duration;

/// One timed cold load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSample {
    /// Zero-based position in the timed sequence.
    pub run_index: u32,
    /// Wall-clock duration of the load.
    pub duration: Duration,
}

/// Raw and outlier-trimmed means of a sample set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadStatistics {
    /// Arithmetic mean over every sample.
    pub raw_mean: Duration,
    /// Mean over the samples no greater than 1.5x the raw mean.
    pub trimmed_mean: Duration,
}

impl LoadStatistics {
    /// Computes both means. An empty sample set yields zero for each.
    ///
    /// The outlier threshold is 1.5x the exact raw mean and is fixed before
    /// trimming. The comparison `sample * 2 * count <= total * 3` runs in
    /// whole nanoseconds so the truncated `raw_mean` never shifts it.
    #[must_use]
    pub fn from_samples(samples: &[LoadSample]) -> Self {
        let durations: Vec<Duration> = samples.iter().map(|sample| sample.duration).collect();
        let count = u128::try_from(durations.len()).unwrap_or(u128::MAX);
        let limit = total(&durations).as_nanos().saturating_mul(3);
        let kept: Vec<Duration> = durations
            .iter()
            .copied()
            .filter(|duration| {
                duration.as_nanos().saturating_mul(2).saturating_mul(count) <= limit
            })
            .collect();
        Self {
            raw_mean: mean(&durations),
            trimmed_mean: mean(&kept),
        }
    }
}

fn total(durations: &[Duration]) -> Duration {
    durations
        .iter()
        .fold(Duration::ZERO, |sum, duration| sum.saturating_add(*duration))
}

fn mean(durations: &[Duration]) -> Duration {
    let Ok(count) = u32::try_from(durations.len()) else {
        return Duration::ZERO;
    };
    total(durations).checked_div(count).unwrap_or(Duration::ZERO)
}
