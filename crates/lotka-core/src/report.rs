//! Serializable campaign report.
//!
//! A [`CampaignReport`] captures everything downstream tools need from one
//! ensemble: the configuration it ran with, the extinction counters, the
//! final peak statistics, the six running series, and the retained
//! trajectories. It is the hand-off point to plotting and reporting code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lotka_types::{CampaignId, Trajectory};

use crate::config::LotkaConfig;
use crate::ensemble::{EnsembleOutcome, RunningSeries};
use crate::stats::SummaryStats;

/// Error type for report operations.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Final answers and running series of one ensemble campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Unique campaign identifier.
    pub id: CampaignId,
    /// When the ensemble started.
    pub started_at: DateTime<Utc>,
    /// When the ensemble finished.
    pub finished_at: DateTime<Utc>,
    /// Configuration the campaign ran with.
    pub config: LotkaConfig,
    /// Ensemble size.
    pub runs: usize,
    /// Runs that ended in total extinction.
    pub all_died: usize,
    /// Runs in which the foxes died out.
    pub foxes_died: usize,
    /// `all_died / runs`.
    pub all_died_fraction: f64,
    /// `foxes_died / runs`, the estimated probability that the foxes die
    /// out before the horizon.
    pub foxes_died_fraction: f64,
    /// Runs with a qualifying second peak.
    pub peaks_found: usize,
    /// Final peak-time statistics (`None` if no run had a peak).
    pub peak_time: Option<SummaryStats>,
    /// Final peak-fox statistics (`None` if no run had a peak).
    pub peak_foxes: Option<SummaryStats>,
    /// Running series indexed by ensemble size.
    pub series: RunningSeries,
    /// Trajectories of the leading runs (empty when not requested).
    pub trajectories: Vec<Trajectory>,
}

impl CampaignReport {
    /// Assemble a report from a finished ensemble.
    pub fn new(
        id: CampaignId,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        config: &LotkaConfig,
        outcome: &EnsembleOutcome,
    ) -> Self {
        let stats = &outcome.statistics;
        let latest = stats.latest();
        let trajectories = if config.output.include_trajectories {
            outcome.trajectories.clone()
        } else {
            Vec::new()
        };

        Self {
            id,
            started_at,
            finished_at,
            config: config.clone(),
            runs: stats.runs(),
            all_died: stats.all_died(),
            foxes_died: stats.foxes_died(),
            all_died_fraction: stats.all_died_fraction(),
            foxes_died_fraction: stats.foxes_died_fraction(),
            peaks_found: stats.peaks_found(),
            peak_time: latest.and_then(|e| e.peak_time),
            peak_foxes: latest.and_then(|e| e.peak_foxes),
            series: stats.series(),
            trajectories,
        }
    }

    /// Wall-clock duration of the campaign in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, ReportError> {
        serde_json::to_string_pretty(self).map_err(|e| ReportError::Serialization(format!("report: {e}")))
    }

    /// Parse a report previously written with [`Self::to_json_pretty`].
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, ReportError> {
        serde_json::from_str(json).map_err(|e| ReportError::Serialization(format!("report: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ensemble::{Ensemble, NoOpObserver};

    fn outcome(config: &LotkaConfig) -> EnsembleOutcome {
        Ensemble::new(config).unwrap().run(&mut NoOpObserver).unwrap()
    }

    fn config(runs: usize, include_trajectories: bool) -> LotkaConfig {
        let mut config = LotkaConfig::default();
        config.ensemble.runs = runs;
        config.ensemble.retained_trajectories = 1;
        config.output.include_trajectories = include_trajectories;
        config
    }

    #[test]
    fn report_mirrors_final_statistics() {
        let config = config(3, true);
        let outcome = outcome(&config);
        let now = Utc::now();
        let report = CampaignReport::new(CampaignId::new(), now, now, &config, &outcome);

        assert_eq!(report.runs, 3);
        assert_eq!(report.series.mean_peak_time.len(), 3);
        assert_eq!(report.trajectories.len(), 1);
        assert_eq!(report.all_died, outcome.statistics.all_died());
        assert_eq!(
            report.peak_time,
            outcome.statistics.latest().and_then(|e| e.peak_time)
        );
        assert!((0.0..=1.0).contains(&report.foxes_died_fraction));
        assert_eq!(report.elapsed_ms(), 0);
    }

    #[test]
    fn trajectories_can_be_left_out() {
        let config = config(2, false);
        let outcome = outcome(&config);
        let now = Utc::now();
        let report = CampaignReport::new(CampaignId::new(), now, now, &config, &outcome);
        assert!(report.trajectories.is_empty());
    }

    #[test]
    fn json_round_trip_preserves_headline_values() {
        let config = config(2, true);
        let outcome = outcome(&config);
        let now = Utc::now();
        let report = CampaignReport::new(CampaignId::new(), now, now, &config, &outcome);
        let json = report.to_json_pretty().unwrap();
        let back = CampaignReport::from_json(&json).unwrap();
        assert_eq!(back.id, report.id);
        assert_eq!(back.runs, report.runs);
        assert_eq!(back.foxes_died, report.foxes_died);
        assert_eq!(back.trajectories.len(), report.trajectories.len());
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CampaignReport::from_json("{not json").is_err());
    }
}
