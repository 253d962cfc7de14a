//! Ensemble driver and running cross-run statistics.
//!
//! The [`Ensemble`] repeats independent runs, scans each finished
//! trajectory for its second fox peak, and folds the result into
//! [`CampaignStatistics`]. After every run exactly one [`RunningEntry`] is
//! appended, so the statistics form series indexed by ensemble size.
//!
//! # Seeding
//!
//! - [`SeedingStrategy::Shared`]: one generator seeded from the master
//!   seed, advanced through all runs in order and never re-seeded.
//! - [`SeedingStrategy::PerRun`]: the master generator only hands out one
//!   seed per run; each run owns its generator. Runs may then execute on
//!   the rayon pool, and are still folded in run order, so the statistics
//!   do not depend on scheduling.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use lotka_types::{Peak, Termination, Trajectory};

use crate::config::{ConfigError, EnsembleConfig, LotkaConfig, SeedingStrategy};
use crate::peak::{PeakCriteria, detect_peak};
use crate::run::{self, RunError, RunSettings};
use crate::stats::SummaryStats;

/// Errors that can occur while running an ensemble.
#[derive(Debug, thiserror::Error)]
pub enum EnsembleError {
    /// The configuration failed validation.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A single run failed.
    #[error("run {run} failed: {source}")]
    Run {
        /// Zero-based index of the failed run.
        run: usize,
        /// The underlying run error.
        source: RunError,
    },
}

// ---------------------------------------------------------------------------
// Per-run results
// ---------------------------------------------------------------------------

/// What the aggregator keeps from one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// Zero-based run index.
    pub run: usize,
    /// The qualifying second peak, if one exists.
    pub peak: Option<Peak>,
    /// How the run ended.
    pub termination: Termination,
    /// Time at which the foxes died out, if they did.
    pub fox_extinction_time: Option<f64>,
    /// Number of events that fired.
    pub events: u64,
    /// Number of recorded samples.
    pub samples: usize,
    /// Full trajectory, kept only for the leading retained runs.
    pub trajectory: Option<Trajectory>,
}

impl RunResult {
    /// Whether both populations died out before the horizon.
    pub const fn all_died(&self) -> bool {
        self.termination.is_absorbed()
    }

    /// Whether the foxes died out at some point.
    pub const fn foxes_died(&self) -> bool {
        self.fox_extinction_time.is_some()
    }
}

// ---------------------------------------------------------------------------
// Running statistics
// ---------------------------------------------------------------------------

/// Cumulative statistics after a given number of runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunningEntry {
    /// Number of runs folded in so far (1-based ensemble size).
    pub runs: usize,
    /// Runs so far with a qualifying peak.
    pub peaks_found: usize,
    /// Runs so far that ended in total extinction.
    pub all_died: usize,
    /// Runs so far in which the foxes died out.
    pub foxes_died: usize,
    /// Peak-time statistics over all peaks so far (`None` until the first).
    pub peak_time: Option<SummaryStats>,
    /// Peak-fox statistics over all peaks so far (`None` until the first).
    pub peak_foxes: Option<SummaryStats>,
}

/// The six running series, with `0.0` for runs before the first peak.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningSeries {
    /// Mean peak time per ensemble size.
    pub mean_peak_time: Vec<f64>,
    /// Upper quartile of peak time per ensemble size.
    pub upper_quartile_peak_time: Vec<f64>,
    /// Lower quartile of peak time per ensemble size.
    pub lower_quartile_peak_time: Vec<f64>,
    /// Mean peak fox count per ensemble size.
    pub mean_peak_foxes: Vec<f64>,
    /// Upper quartile of peak fox count per ensemble size.
    pub upper_quartile_peak_foxes: Vec<f64>,
    /// Lower quartile of peak fox count per ensemble size.
    pub lower_quartile_peak_foxes: Vec<f64>,
}

/// Growing record of cross-run statistics.
///
/// Starts empty, gains exactly one [`RunningEntry`] per recorded run, and
/// never drops an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignStatistics {
    entries: Vec<RunningEntry>,
    peak_times: Vec<f64>,
    peak_foxes: Vec<f64>,
    all_died: usize,
    foxes_died: usize,
}

impl CampaignStatistics {
    /// Empty statistics with room for `runs` entries.
    pub fn with_capacity(runs: usize) -> Self {
        Self {
            entries: Vec::with_capacity(runs),
            ..Self::default()
        }
    }

    /// Fold one run in and return the new running entry.
    ///
    /// When the run contributes a peak, mean and quartiles are recomputed
    /// from every peak collected so far.
    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, result: &RunResult) -> RunningEntry {
        if result.all_died() {
            self.all_died = self.all_died.saturating_add(1);
        }
        if result.foxes_died() {
            self.foxes_died = self.foxes_died.saturating_add(1);
        }

        let previous = self.entries.last();
        let (peak_time, peak_foxes) = if let Some(peak) = result.peak {
            self.peak_times.push(peak.time);
            self.peak_foxes.push(peak.foxes as f64);
            (
                SummaryStats::of(&self.peak_times),
                SummaryStats::of(&self.peak_foxes),
            )
        } else {
            // Unchanged peaks, unchanged statistics.
            (
                previous.and_then(|e| e.peak_time),
                previous.and_then(|e| e.peak_foxes),
            )
        };

        let entry = RunningEntry {
            runs: self.entries.len().saturating_add(1),
            peaks_found: self.peak_times.len(),
            all_died: self.all_died,
            foxes_died: self.foxes_died,
            peak_time,
            peak_foxes,
        };
        self.entries.push(entry);
        entry
    }

    /// All running entries, one per recorded run.
    pub fn entries(&self) -> &[RunningEntry] {
        &self.entries
    }

    /// The entry after the most recent run.
    pub fn latest(&self) -> Option<&RunningEntry> {
        self.entries.last()
    }

    /// Number of recorded runs.
    pub fn runs(&self) -> usize {
        self.entries.len()
    }

    /// Runs that ended in total extinction.
    pub const fn all_died(&self) -> usize {
        self.all_died
    }

    /// Runs in which the foxes died out.
    pub const fn foxes_died(&self) -> usize {
        self.foxes_died
    }

    /// Runs with a qualifying peak.
    pub fn peaks_found(&self) -> usize {
        self.peak_times.len()
    }

    /// Runs without a qualifying peak.
    pub fn runs_without_peak(&self) -> usize {
        self.runs().saturating_sub(self.peaks_found())
    }

    /// Whether runs without a peak outnumber runs with one.
    pub fn mostly_without_peak(&self) -> bool {
        self.runs_without_peak() > self.peaks_found()
    }

    /// Times of every peak found, in run order.
    pub fn peak_times(&self) -> &[f64] {
        &self.peak_times
    }

    /// Fox counts of every peak found, in run order.
    pub fn peak_foxes(&self) -> &[f64] {
        &self.peak_foxes
    }

    /// Fraction of runs that ended in total extinction.
    #[allow(clippy::cast_precision_loss)]
    pub fn all_died_fraction(&self) -> f64 {
        fraction(self.all_died, self.runs())
    }

    /// Fraction of runs in which the foxes died out.
    #[allow(clippy::cast_precision_loss)]
    pub fn foxes_died_fraction(&self) -> f64 {
        fraction(self.foxes_died, self.runs())
    }

    /// The six running series for plotting.
    pub fn series(&self) -> RunningSeries {
        let mut series = RunningSeries::default();
        for entry in &self.entries {
            let time = entry.peak_time;
            let foxes = entry.peak_foxes;
            series.mean_peak_time.push(time.map_or(0.0, |s| s.mean));
            series
                .upper_quartile_peak_time
                .push(time.map_or(0.0, |s| s.upper_quartile));
            series
                .lower_quartile_peak_time
                .push(time.map_or(0.0, |s| s.lower_quartile));
            series.mean_peak_foxes.push(foxes.map_or(0.0, |s| s.mean));
            series
                .upper_quartile_peak_foxes
                .push(foxes.map_or(0.0, |s| s.upper_quartile));
            series
                .lower_quartile_peak_foxes
                .push(foxes.map_or(0.0, |s| s.lower_quartile));
        }
        series
    }
}

#[allow(clippy::cast_precision_loss)]
fn fraction(count: usize, runs: usize) -> f64 {
    if runs == 0 {
        0.0
    } else {
        count as f64 / runs as f64
    }
}

// ---------------------------------------------------------------------------
// Observation
// ---------------------------------------------------------------------------

/// Callback invoked after each run is folded into the statistics.
///
/// Implementations can use this to report progress or stream results.
pub trait RunObserver {
    /// Called once per run, in run order.
    fn on_run(&mut self, entry: &RunningEntry, result: &RunResult);
}

/// A no-op observer for testing.
pub struct NoOpObserver;

impl RunObserver for NoOpObserver {
    fn on_run(&mut self, _entry: &RunningEntry, _result: &RunResult) {}
}

// ---------------------------------------------------------------------------
// Ensemble driver
// ---------------------------------------------------------------------------

/// Output of a complete ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleOutcome {
    /// Running statistics after every run.
    pub statistics: CampaignStatistics,
    /// Trajectories of the leading retained runs, in run order.
    pub trajectories: Vec<Trajectory>,
}

/// Repeats independent runs and aggregates their peaks and extinctions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ensemble {
    settings: RunSettings,
    criteria: PeakCriteria,
    config: EnsembleConfig,
}

impl Ensemble {
    /// Build an ensemble from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::Config`] if the configuration is invalid.
    pub fn new(config: &LotkaConfig) -> Result<Self, EnsembleError> {
        config.validate()?;
        Ok(Self {
            settings: RunSettings::from_config(config),
            criteria: PeakCriteria::from(&config.peak),
            config: config.ensemble,
        })
    }

    /// Execute every run and return the aggregated outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EnsembleError::Run`] if any run breaks an invariant.
    pub fn run(&self, observer: &mut dyn RunObserver) -> Result<EnsembleOutcome, EnsembleError> {
        let runs = self.config.runs;
        info!(
            runs,
            seed = self.config.seed,
            seeding = ?self.config.seeding,
            parallel = self.config.parallel,
            horizon_days = self.settings.horizon,
            rabbits = self.settings.initial.rabbits,
            foxes = self.settings.initial.foxes,
            "Ensemble starting"
        );

        let mut fold = Fold {
            statistics: CampaignStatistics::with_capacity(runs),
            trajectories: Vec::new(),
            observer,
        };

        match self.config.seeding {
            SeedingStrategy::Shared => {
                let mut rng = SmallRng::seed_from_u64(self.config.seed);
                for run in 0..runs {
                    fold.push(self.run_one(run, &mut rng)?);
                }
            }
            SeedingStrategy::PerRun => {
                let seeds = derive_seeds(self.config.seed, runs);
                if self.config.parallel {
                    let results = seeds
                        .par_iter()
                        .enumerate()
                        .map(|(run, &seed)| self.run_one(run, &mut SmallRng::seed_from_u64(seed)))
                        .collect::<Result<Vec<_>, _>>()?;
                    for result in results {
                        fold.push(result);
                    }
                } else {
                    for (run, &seed) in seeds.iter().enumerate() {
                        fold.push(self.run_one(run, &mut SmallRng::seed_from_u64(seed))?);
                    }
                }
            }
        }

        let Fold {
            statistics,
            trajectories,
            ..
        } = fold;

        if statistics.peaks_found() == 0 {
            warn!(runs, "No run produced a qualifying second peak");
        } else if statistics.mostly_without_peak() {
            warn!(
                runs,
                runs_without_peak = statistics.runs_without_peak(),
                peaks_found = statistics.peaks_found(),
                "Most runs produced no qualifying second peak"
            );
        }
        info!(
            runs = statistics.runs(),
            all_died = statistics.all_died(),
            foxes_died = statistics.foxes_died(),
            peaks_found = statistics.peaks_found(),
            "Ensemble complete"
        );

        Ok(EnsembleOutcome {
            statistics,
            trajectories,
        })
    }

    /// Simulate run `run` and reduce it to what the aggregator keeps.
    fn run_one<R: Rng + ?Sized>(&self, run: usize, rng: &mut R) -> Result<RunResult, EnsembleError> {
        let record =
            run::simulate(&self.settings, rng).map_err(|source| EnsembleError::Run { run, source })?;
        let peak = detect_peak(&record.trajectory, &self.criteria);
        let samples = record.trajectory.len();
        let retain = run < self.config.retained_trajectories;
        Ok(RunResult {
            run,
            peak,
            termination: record.termination,
            fox_extinction_time: record.fox_extinction_time,
            events: record.events,
            samples,
            trajectory: retain.then_some(record.trajectory),
        })
    }
}

/// Draw one independent seed per run from a master generator.
pub fn derive_seeds(master_seed: u64, runs: usize) -> Vec<u64> {
    let mut master = SmallRng::seed_from_u64(master_seed);
    (0..runs).map(|_| master.random()).collect()
}

/// Accumulator folding run results in run order.
struct Fold<'a> {
    statistics: CampaignStatistics,
    trajectories: Vec<Trajectory>,
    observer: &'a mut dyn RunObserver,
}

impl Fold<'_> {
    fn push(&mut self, mut result: RunResult) {
        let entry = self.statistics.record(&result);
        debug!(
            run = result.run,
            termination = ?result.termination,
            events = result.events,
            peak_time = result.peak.map(|p| p.time),
            peak_foxes = result.peak.map(|p| p.foxes),
            "Run aggregated"
        );
        self.observer.on_run(&entry, &result);
        if let Some(trajectory) = result.trajectory.take() {
            self.trajectories.push(trajectory);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn result(run: usize, peak: Option<(f64, u64)>, termination: Termination, foxes_died: bool) -> RunResult {
        RunResult {
            run,
            peak: peak.map(|(time, foxes)| Peak {
                index: 1,
                time,
                foxes,
            }),
            termination,
            fox_extinction_time: foxes_died.then_some(100.0),
            events: 0,
            samples: 0,
            trajectory: None,
        }
    }

    fn small_config(runs: usize) -> LotkaConfig {
        let mut config = LotkaConfig::default();
        config.ensemble.runs = runs;
        config.ensemble.retained_trajectories = 2;
        config
    }

    #[test]
    fn peakless_majority() {
        let mut stats = CampaignStatistics::default();
        assert!(!stats.mostly_without_peak());

        stats.record(&result(0, Some((300.0, 500)), Termination::HorizonReached, false));
        stats.record(&result(1, None, Termination::HorizonReached, true));
        assert_eq!(stats.runs_without_peak(), 1);
        assert!(!stats.mostly_without_peak());

        stats.record(&result(2, None, Termination::Absorbed, true));
        assert_eq!(stats.runs_without_peak(), 2);
        assert!(stats.mostly_without_peak());
    }

    #[test]
    fn statistics_start_empty_and_grow_by_one() {
        let mut stats = CampaignStatistics::default();
        assert_eq!(stats.runs(), 0);
        assert!(stats.latest().is_none());
        for run in 0..5 {
            stats.record(&result(run, None, Termination::HorizonReached, false));
            assert_eq!(stats.runs(), run + 1);
        }
    }

    #[test]
    fn no_statistics_until_first_peak() {
        let mut stats = CampaignStatistics::default();
        let first = stats.record(&result(0, None, Termination::HorizonReached, false));
        assert_eq!(first.peak_time, None);
        let second = stats.record(&result(1, Some((400.0, 2000)), Termination::HorizonReached, false));
        assert_eq!(second.peaks_found, 1);
        assert!(second.peak_time.is_some_and(|s| (s.mean - 400.0).abs() < 1e-9));
        let series = stats.series();
        assert!(series.mean_peak_time[0].abs() < f64::EPSILON);
        assert!((series.mean_peak_time[1] - 400.0).abs() < 1e-9);
    }

    #[test]
    fn statistics_are_recomputed_over_all_peaks() {
        let mut stats = CampaignStatistics::default();
        for (run, time) in [100.0, 200.0, 300.0, 400.0, 500.0].into_iter().enumerate() {
            stats.record(&result(run, Some((time, 1000)), Termination::HorizonReached, false));
        }
        let last = stats.latest().unwrap();
        let time = last.peak_time.unwrap();
        assert!((time.mean - 300.0).abs() < 1e-9);
        assert!((time.lower_quartile - 200.0).abs() < 1e-9);
        assert!((time.upper_quartile - 400.0).abs() < 1e-9);
        let foxes = last.peak_foxes.unwrap();
        assert!((foxes.interquartile_range()).abs() < 1e-9);
    }

    #[test]
    fn run_without_peak_carries_statistics_forward() {
        let mut stats = CampaignStatistics::default();
        let with_peak = stats.record(&result(0, Some((300.0, 1500)), Termination::HorizonReached, false));
        let without = stats.record(&result(1, None, Termination::HorizonReached, false));
        assert_eq!(with_peak.peak_time, without.peak_time);
        assert_eq!(without.peaks_found, 1);
    }

    #[test]
    fn extinction_counters() {
        let mut stats = CampaignStatistics::default();
        stats.record(&result(0, None, Termination::Absorbed, true));
        stats.record(&result(1, None, Termination::HorizonReached, true));
        stats.record(&result(2, None, Termination::HorizonReached, false));
        stats.record(&result(3, Some((350.0, 900)), Termination::HorizonReached, false));
        assert_eq!(stats.all_died(), 1);
        assert_eq!(stats.foxes_died(), 2);
        assert!((stats.all_died_fraction() - 0.25).abs() < 1e-12);
        assert!((stats.foxes_died_fraction() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn series_have_one_value_per_run() {
        let mut stats = CampaignStatistics::default();
        for run in 0..7 {
            stats.record(&result(run, Some((250.0, 500)), Termination::HorizonReached, false));
        }
        let series = stats.series();
        for column in [
            &series.mean_peak_time,
            &series.upper_quartile_peak_time,
            &series.lower_quartile_peak_time,
            &series.mean_peak_foxes,
            &series.upper_quartile_peak_foxes,
            &series.lower_quartile_peak_foxes,
        ] {
            assert_eq!(column.len(), 7);
        }
    }

    #[test]
    fn derived_seeds_are_reproducible() {
        assert_eq!(derive_seeds(5, 10), derive_seeds(5, 10));
        assert_ne!(derive_seeds(5, 10), derive_seeds(6, 10));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = small_config(3);
        config.rates.rabbit_birth = -1.0;
        assert!(matches!(Ensemble::new(&config), Err(EnsembleError::Config { .. })));
    }

    #[test]
    fn zero_rate_constant_cannot_fake_absorption() {
        // With no rabbit births, (5, 0) would have zero total propensity.
        let mut config = small_config(1);
        config.rates.rabbit_birth = 0.0;
        config.initial.rabbits = 5;
        config.initial.foxes = 0;
        assert!(matches!(Ensemble::new(&config), Err(EnsembleError::Config { .. })));
    }

    #[test]
    fn retains_only_leading_trajectories() {
        let ensemble = Ensemble::new(&small_config(4)).unwrap();
        let outcome = ensemble.run(&mut NoOpObserver).unwrap();
        assert_eq!(outcome.statistics.runs(), 4);
        assert_eq!(outcome.trajectories.len(), 2);
    }

    #[test]
    fn observer_sees_every_run_in_order() {
        struct Recorder(Vec<(usize, usize)>);
        impl RunObserver for Recorder {
            fn on_run(&mut self, entry: &RunningEntry, result: &RunResult) {
                self.0.push((entry.runs, result.run));
            }
        }

        let ensemble = Ensemble::new(&small_config(3)).unwrap();
        let mut recorder = Recorder(Vec::new());
        ensemble.run(&mut recorder).unwrap();
        assert_eq!(recorder.0, vec![(1, 0), (2, 1), (3, 2)]);
    }
}
