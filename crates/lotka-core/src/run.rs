//! One stochastic trajectory from the initial state to the horizon.
//!
//! A run is a small state machine:
//!
//! ```text
//! Running --(total propensity == 0)--> Absorbed
//! Running --(time >= horizon)--------> HorizonReached
//! ```
//!
//! Every accepted event appends one sample, including the event that
//! carries time past the horizon. An absorbed run gets one extra sample
//! at `time = horizon` holding the final (all-zero) state so plots extend
//! to the end of the window.

use rand::Rng;
use tracing::trace;

use lotka_types::{Event, Population, Sample, Termination, Trajectory};

use crate::config::{LotkaConfig, RateConstants};
use crate::rates::propensities;
use crate::stepper::{self, StepError, StepOutcome};

/// Errors that can occur during a run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A step violated a stepper invariant.
    #[error("step error: {source}")]
    Step {
        /// The underlying step error.
        #[from]
        source: StepError,
    },
}

/// Parameters shared by every run of an ensemble.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// Rate constants of the elementary events.
    pub constants: RateConstants,
    /// Population at `t = 0`.
    pub initial: Population,
    /// Simulated days after which the run stops.
    pub horizon: f64,
}

impl RunSettings {
    /// Extract run parameters from a full configuration.
    pub const fn from_config(config: &LotkaConfig) -> Self {
        Self {
            constants: config.rates,
            initial: config.initial.population(),
            horizon: config.simulation.horizon_days,
        }
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from_config(&LotkaConfig::default())
    }
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// Full sample history.
    pub trajectory: Trajectory,
    /// How the run ended.
    pub termination: Termination,
    /// Time at which a fox death brought the foxes to zero, if it happened.
    pub fox_extinction_time: Option<f64>,
    /// Number of events that fired.
    pub events: u64,
}

impl RunRecord {
    /// Whether the foxes died out during the run.
    pub const fn foxes_died(&self) -> bool {
        self.fox_extinction_time.is_some()
    }
}

/// Simulate one trajectory.
///
/// # Errors
///
/// Returns [`RunError`] if a step breaks an invariant (unreachable with
/// validated configuration).
pub fn simulate<R: Rng + ?Sized>(settings: &RunSettings, rng: &mut R) -> Result<RunRecord, RunError> {
    let horizon = settings.horizon;
    let mut time = 0.0;
    let mut population = settings.initial;
    let mut trajectory = Trajectory::starting_at(time, population);
    let mut fox_extinction_time = None;
    let mut events: u64 = 0;

    let termination = loop {
        if time >= horizon {
            break Termination::HorizonReached;
        }

        let rates = propensities(&settings.constants, population);
        match stepper::step(population, &rates, rng)? {
            StepOutcome::Absorbed => {
                trajectory.push(Sample::at(horizon, population));
                break Termination::Absorbed;
            }
            StepOutcome::Fired(step) => {
                time += step.waiting_time;
                population = step.population;
                events = events.saturating_add(1);
                if step.event == Event::FoxDeath && population.foxes == 0 {
                    fox_extinction_time.get_or_insert(time);
                }
                trajectory.push(Sample::at(time, population));
            }
        }
    };

    trace!(
        ?termination,
        events,
        samples = trajectory.len(),
        final_time = trajectory.final_time(),
        "Run finished"
    );

    Ok(RunRecord {
        trajectory,
        termination,
        fox_extinction_time,
        events,
    })
}
