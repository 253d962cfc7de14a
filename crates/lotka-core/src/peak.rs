//! Detection of the second fox peak within one trajectory.
//!
//! Each sample is masked: it keeps its fox count only if it lies after
//! `min_time` and has more than `min_foxes` foxes, otherwise it counts as
//! zero. The peak is the first sample attaining the global maximum of the
//! masked signal. If nothing survives the mask there is no peak.
//!
//! This is the global maximum under the mask, not the first local maximum
//! after `min_time`; on noisy trajectories the two can disagree.

use lotka_types::{Peak, Sample, Trajectory};

use crate::config::PeakConfig;

/// Thresholds a sample must strictly exceed to qualify as a peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakCriteria {
    /// Earliest qualifying time (exclusive), in days.
    pub min_time: f64,
    /// Smallest qualifying fox count (exclusive).
    pub min_foxes: u64,
}

impl PeakCriteria {
    /// Whether a sample passes both thresholds.
    pub fn qualifies(&self, sample: &Sample) -> bool {
        sample.time > self.min_time && sample.foxes > self.min_foxes
    }

    /// The masked fox count of a sample.
    pub fn masked(&self, sample: &Sample) -> u64 {
        if self.qualifies(sample) { sample.foxes } else { 0 }
    }
}

impl From<&PeakConfig> for PeakCriteria {
    fn from(config: &PeakConfig) -> Self {
        Self {
            min_time: config.min_time_days,
            min_foxes: config.min_foxes,
        }
    }
}

impl Default for PeakCriteria {
    fn default() -> Self {
        Self::from(&PeakConfig::default())
    }
}

/// Masked fox signal for the whole trajectory.
pub fn masked_signal(trajectory: &Trajectory, criteria: &PeakCriteria) -> Vec<u64> {
    trajectory.samples().map(|s| criteria.masked(&s)).collect()
}

/// Find the qualifying peak of `trajectory`, if any.
pub fn detect_peak(trajectory: &Trajectory, criteria: &PeakCriteria) -> Option<Peak> {
    let mut best: Option<(usize, Sample)> = None;
    for (index, sample) in trajectory.samples().enumerate() {
        if !criteria.qualifies(&sample) {
            continue;
        }
        // Strictly greater keeps the first index on ties.
        if best.is_none_or(|(_, b)| sample.foxes > b.foxes) {
            best = Some((index, sample));
        }
    }
    best.map(|(index, sample)| Peak {
        index,
        time: sample.time,
        foxes: sample.foxes,
    })
}
