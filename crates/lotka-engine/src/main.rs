//! Ensemble binary for the Lotka predator-prey model.
//!
//! Loads configuration, installs structured logging, runs the stochastic
//! ensemble, logs the headline answers, and writes a JSON campaign report.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `LOTKA_CONFIG` or `lotka-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the ensemble from the validated config
//! 4. Run every simulation, aggregating as runs complete
//! 5. Log the campaign summary
//! 6. Write the report

mod error;
mod export;
mod progress;

use std::path::PathBuf;

use chrono::Utc;
use lotka_core::config::{LogFormat, LotkaConfig};
use lotka_core::ensemble::Ensemble;
use lotka_core::report::CampaignReport;
use lotka_types::CampaignId;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::progress::ProgressObserver;

/// Environment variable naming an alternative config file.
const CONFIG_ENV: &str = "LOTKA_CONFIG";

/// Config file looked up in the working directory.
const DEFAULT_CONFIG_PATH: &str = "lotka-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the ensemble, or the report export fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config)?;
    info!("lotka-engine starting");
    match &source {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        runs = config.ensemble.runs,
        seed = config.ensemble.seed,
        seeding = ?config.ensemble.seeding,
        parallel = config.ensemble.parallel,
        horizon_days = config.simulation.horizon_days,
        rabbits = config.initial.rabbits,
        foxes = config.initial.foxes,
        "Campaign configuration"
    );

    // 3. Build the ensemble.
    let ensemble = Ensemble::new(&config)?;

    // 4. Run.
    let campaign_id = CampaignId::new();
    let started_at = Utc::now();
    let mut observer =
        ProgressObserver::new(config.logging.progress_interval, config.ensemble.runs);
    let outcome = ensemble.run(&mut observer)?;
    let finished_at = Utc::now();

    // 5. Summarize.
    let report = CampaignReport::new(campaign_id, started_at, finished_at, &config, &outcome);
    log_summary(&report);

    // 6. Export.
    match &config.output.report_path {
        Some(path) => {
            export::write_report(&report, path)?;
        }
        None => info!("Report output disabled"),
    }

    info!(
        campaign_id = %report.id,
        elapsed_ms = report.elapsed_ms(),
        "lotka-engine shutdown complete"
    );
    Ok(())
}

/// Load the configuration from `LOTKA_CONFIG` or `lotka-config.yaml`.
///
/// An explicitly named file must exist. The default file is optional; when
/// it is missing the defaults are used, with environment overrides applied.
/// Returns the config and the path it was read from, if any.
fn load_config() -> Result<(LotkaConfig, Option<PathBuf>), EngineError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        let config = LotkaConfig::from_file(&path)?;
        return Ok((config, Some(path)));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = LotkaConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = LotkaConfig::default();
        config.ensemble.apply_env_overrides()?;
        config.validate()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(config: &LotkaConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter: {e}"),
        })?;

    let installed = match config.logging.format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init(),
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

/// Log the three campaign answers: mean peak time with quartiles, mean
/// peak fox count with quartiles, and the extinction probabilities.
fn log_summary(report: &CampaignReport) {
    match (report.peak_time, report.peak_foxes) {
        (Some(time), Some(foxes)) => info!(
            peaks_found = report.peaks_found,
            mean_peak_time = time.mean,
            peak_time_q1 = time.lower_quartile,
            peak_time_q3 = time.upper_quartile,
            peak_time_iqr = time.interquartile_range(),
            mean_peak_foxes = foxes.mean,
            peak_foxes_q1 = foxes.lower_quartile,
            peak_foxes_q3 = foxes.upper_quartile,
            peak_foxes_iqr = foxes.interquartile_range(),
            "Second fox peak"
        ),
        _ => warn!(runs = report.runs, "No run produced a qualifying fox peak"),
    }

    info!(
        runs = report.runs,
        all_died = report.all_died,
        all_died_fraction = report.all_died_fraction,
        foxes_died = report.foxes_died,
        foxes_died_fraction = report.foxes_died_fraction,
        "Extinction"
    );
}
