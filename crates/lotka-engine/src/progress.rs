//! Run observer that reports ensemble progress through `tracing`.
//!
//! Emits one `info` line every `interval` runs with the running answers so
//! a long campaign shows how the estimates settle as the ensemble grows.

use lotka_core::ensemble::{RunObserver, RunResult, RunningEntry};
use tracing::info;

/// Observer logging a progress line at a fixed run interval.
pub struct ProgressObserver {
    interval: usize,
    total: usize,
    lines: usize,
}

impl ProgressObserver {
    /// Log every `interval` runs out of `total` (an interval of 0 disables
    /// progress lines).
    pub const fn new(interval: usize, total: usize) -> Self {
        Self {
            interval,
            total,
            lines: 0,
        }
    }

    /// Number of progress lines emitted so far.
    pub const fn lines(&self) -> usize {
        self.lines
    }

    fn due(&self, runs: usize) -> bool {
        runs.checked_rem(self.interval) == Some(0) || (self.interval != 0 && runs == self.total)
    }
}

impl RunObserver for ProgressObserver {
    fn on_run(&mut self, entry: &RunningEntry, _result: &RunResult) {
        if !self.due(entry.runs) {
            return;
        }
        self.lines = self.lines.saturating_add(1);
        info!(
            runs = entry.runs,
            total = self.total,
            peaks_found = entry.peaks_found,
            all_died = entry.all_died,
            foxes_died = entry.foxes_died,
            mean_peak_time = entry.peak_time.map(|s| s.mean),
            mean_peak_foxes = entry.peak_foxes.map(|s| s.mean),
            "Ensemble progress"
        );
    }
}
