//! Configuration loading and typed config structures for the ensemble.
//!
//! The canonical configuration lives in `lotka-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, provides a loader that reads the file, and validates the
//! values before any simulation starts.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the reference experiment: 400 rabbits, 200 foxes, 600 days, 1000 runs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lotka_types::Population;

/// Environment variable overriding `ensemble.seed`.
pub const SEED_ENV: &str = "LOTKA_SEED";

/// Environment variable overriding `ensemble.runs`.
pub const RUNS_ENV: &str = "LOTKA_RUNS";

/// Errors that can occur when loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed correctly but is outside its allowed range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level ensemble configuration.
///
/// Mirrors the structure of `lotka-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotkaConfig {
    /// Rate constants of the four elementary events.
    #[serde(default)]
    pub rates: RateConstants,

    /// Starting population of every run.
    #[serde(default)]
    pub initial: InitialPopulation,

    /// Per-run time bounds.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Ensemble size, seeding, and retention.
    #[serde(default)]
    pub ensemble: EnsembleConfig,

    /// Second-peak qualification thresholds.
    #[serde(default)]
    pub peak: PeakConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Report output configuration.
    #[serde(default)]
    pub output: OutputConfig,
}

impl LotkaConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `LOTKA_SEED` overrides `ensemble.seed`
    /// - `LOTKA_RUNS` overrides `ensemble.runs`
    ///
    /// The result is validated before it is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = serde_yml::from_str(&contents)?;
        config.ensemble.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rates.validate()?;
        self.simulation.validate()?;
        self.ensemble.validate()?;
        self.peak.validate()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Rate constants of the elementary events.
///
/// Units are per day (`rabbit_birth`, `fox_death`) or per day per
/// individual of the other species (`rabbit_death`, `fox_birth`).
///
/// Every constant must be finite and strictly positive, so the total
/// propensity is zero only at (0, 0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConstants {
    /// `k1`: rabbit birth rate per rabbit.
    #[serde(default = "default_rabbit_birth")]
    pub rabbit_birth: f64,

    /// `k2`: rabbit death rate per rabbit per fox.
    #[serde(default = "default_rabbit_death")]
    pub rabbit_death: f64,

    /// `k3`: fox birth rate per fox per rabbit.
    #[serde(default = "default_fox_birth")]
    pub fox_birth: f64,

    /// `k4`: fox death rate per fox.
    #[serde(default = "default_fox_death")]
    pub fox_death: f64,
}

impl RateConstants {
    fn validate(&self) -> Result<(), ConfigError> {
        let named = [
            ("rates.rabbit_birth", self.rabbit_birth),
            ("rates.rabbit_death", self.rabbit_death),
            ("rates.fox_birth", self.fox_birth),
            ("rates.fox_death", self.fox_death),
        ];
        for (name, value) in named {
            require_positive(name, value)?;
        }
        Ok(())
    }
}

impl Default for RateConstants {
    fn default() -> Self {
        Self {
            rabbit_birth: default_rabbit_birth(),
            rabbit_death: default_rabbit_death(),
            fox_birth: default_fox_birth(),
            fox_death: default_fox_death(),
        }
    }
}

/// Starting population of every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPopulation {
    /// Rabbits at `t = 0`.
    #[serde(default = "default_initial_rabbits")]
    pub rabbits: u64,

    /// Foxes at `t = 0`.
    #[serde(default = "default_initial_foxes")]
    pub foxes: u64,
}

impl InitialPopulation {
    /// The configured counts as a [`Population`].
    pub const fn population(&self) -> Population {
        Population::new(self.rabbits, self.foxes)
    }
}

impl Default for InitialPopulation {
    fn default() -> Self {
        Self {
            rabbits: default_initial_rabbits(),
            foxes: default_initial_foxes(),
        }
    }
}

/// Per-run time bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Simulated days after which a run stops.
    #[serde(default = "default_horizon_days")]
    pub horizon_days: f64,
}

impl SimulationBoundsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.horizon_days.is_finite() || self.horizon_days <= 0.0 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.horizon_days must be finite and positive, got {}",
                    self.horizon_days
                ),
            });
        }
        Ok(())
    }
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
        }
    }
}

/// How random generators are assigned to runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingStrategy {
    /// One generator seeded from the master seed, advanced across all runs
    /// in order and never re-seeded.
    #[default]
    Shared,
    /// One generator per run, seeded from a value drawn from the master
    /// generator. Runs are then independent of execution order.
    PerRun,
}

/// Ensemble size, seeding, and retention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Number of independent runs.
    #[serde(default = "default_runs")]
    pub runs: usize,

    /// Master seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Generator assignment strategy.
    #[serde(default)]
    pub seeding: SeedingStrategy,

    /// Execute runs on the rayon thread pool (requires `per_run` seeding).
    #[serde(default)]
    pub parallel: bool,

    /// Number of leading runs whose full trajectory is kept.
    #[serde(default = "default_retained_trajectories")]
    pub retained_trajectories: usize,
}

impl EnsembleConfig {
    /// Override the seed and run count with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable is set but does not
    /// parse as an unsigned integer.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var(SEED_ENV) {
            self.seed = parse_env(SEED_ENV, &val)?;
        }
        if let Ok(val) = std::env::var(RUNS_ENV) {
            self.runs = parse_env(RUNS_ENV, &val)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.runs == 0 {
            return Err(ConfigError::Invalid {
                reason: "ensemble.runs must be at least 1".to_owned(),
            });
        }
        if self.parallel && self.seeding == SeedingStrategy::Shared {
            return Err(ConfigError::Invalid {
                reason: "ensemble.parallel requires ensemble.seeding: per_run".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            seed: default_seed(),
            seeding: SeedingStrategy::Shared,
            parallel: false,
            retained_trajectories: default_retained_trajectories(),
        }
    }
}

/// Second-peak qualification thresholds.
///
/// A sample qualifies when both values are strictly exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakConfig {
    /// Samples at or before this day never qualify.
    #[serde(default = "default_peak_min_time_days")]
    pub min_time_days: f64,

    /// Samples with this many foxes or fewer never qualify.
    #[serde(default = "default_peak_min_foxes")]
    pub min_foxes: u64,
}

impl PeakConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("peak.min_time_days", self.min_time_days)
    }
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            min_time_days: default_peak_min_time_days(),
            min_foxes: default_peak_min_foxes(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log a progress line every N completed runs (0 = never).
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Pretty,
            progress_interval: default_progress_interval(),
        }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Where to write the JSON campaign report (`null` = don't write).
    #[serde(default = "default_report_path")]
    pub report_path: Option<PathBuf>,

    /// Whether retained trajectories are embedded in the report.
    #[serde(default = "default_true")]
    pub include_trajectories: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_path: default_report_path(),
            include_trajectories: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn require_positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be finite and positive, got {value}"),
        })
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            reason: format!("{name} must be finite and non-negative, got {value}"),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_parse_err| ConfigError::Invalid {
        reason: format!("{name} must be an unsigned integer, got {value:?}"),
    })
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_rabbit_birth() -> f64 {
    0.015
}

const fn default_rabbit_death() -> f64 {
    0.000_04
}

const fn default_fox_birth() -> f64 {
    0.000_4
}

const fn default_fox_death() -> f64 {
    0.04
}

const fn default_initial_rabbits() -> u64 {
    400
}

const fn default_initial_foxes() -> u64 {
    200
}

const fn default_horizon_days() -> f64 {
    600.0
}

const fn default_runs() -> usize {
    1000
}

const fn default_seed() -> u64 {
    1
}

const fn default_retained_trajectories() -> usize {
    10
}

const fn default_peak_min_time_days() -> f64 {
    200.0
}

const fn default_peak_min_foxes() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_progress_interval() -> usize {
    100
}

fn default_report_path() -> Option<PathBuf> {
    Some(PathBuf::from("lotka-report.json"))
}

const fn default_true() -> bool {
    true
}
