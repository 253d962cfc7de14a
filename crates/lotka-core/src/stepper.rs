//! Single step of the rejection-free stochastic simulation algorithm.
//!
//! Given the current propensities with total `S`:
//!
//! 1. If `S` is zero the process is absorbed and nothing can fire.
//! 2. Draw the waiting time `dt ~ Exp(S)` (exact, never a fixed step).
//! 3. Draw `u ~ U[0, S)` and walk the events in
//!    [`Event::SELECTION_ORDER`], consuming cumulative propensity; the
//!    event whose interval contains `u` fires.
//! 4. Apply the event to the population (exactly one count moves by one).
//!
//! The generator is always passed in explicitly so callers decide how
//! streams are shared between runs.

use rand::Rng;
use rand_distr::{Distribution, Exp};

use lotka_types::{Event, Population, Rates};

/// Errors raised by a single step.
///
/// Neither variant is reachable with validated configuration; they exist
/// so a broken invariant surfaces as a value instead of a panic.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    /// The total propensity cannot parameterize an exponential distribution.
    #[error("invalid total propensity {total}")]
    InvalidTotalRate {
        /// The offending total.
        total: f64,
    },

    /// The selected event would drive a count below zero.
    #[error("event {event} cannot fire in population {population:?}")]
    CountUnderflow {
        /// The selected event.
        event: Event,
        /// The population it was applied to.
        population: Population,
    },
}

/// Result of asking the stepper for the next event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// All propensities are zero; the run must terminate.
    Absorbed,
    /// One event fired.
    Fired(Step),
}

/// A fired event together with its waiting time and resulting population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    /// The event that fired.
    pub event: Event,
    /// Time elapsed since the previous event, in days.
    pub waiting_time: f64,
    /// Population after the event.
    pub population: Population,
}

/// Pick the event whose cumulative interval contains `u`.
///
/// `u` is expected in `[0, rates.total())`. Zero-rate events own an empty
/// interval and are never chosen. If rounding leaves `u` past the final
/// cumulative bound, the last event with a positive rate is chosen.
/// Returns `None` only when every rate is zero.
pub fn select_event(rates: &Rates, u: f64) -> Option<Event> {
    let mut remaining = u;
    let mut last_positive = None;
    for (event, rate) in rates.in_selection_order() {
        if rate <= 0.0 {
            continue;
        }
        if remaining < rate {
            return Some(event);
        }
        remaining -= rate;
        last_positive = Some(event);
    }
    last_positive
}

/// Draw a waiting time from `Exp(total)`.
///
/// # Errors
///
/// Returns [`StepError::InvalidTotalRate`] if `total` is not a positive
/// finite number.
pub fn waiting_time<R: Rng + ?Sized>(total: f64, rng: &mut R) -> Result<f64, StepError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(StepError::InvalidTotalRate { total });
    }
    let exp = Exp::new(total).map_err(|_exp_err| StepError::InvalidTotalRate { total })?;
    Ok(exp.sample(rng))
}

/// Advance `population` by one event.
///
/// # Errors
///
/// Returns [`StepError`] if the propensities are not finite or the
/// selected event cannot be applied.
pub fn step<R: Rng + ?Sized>(
    population: Population,
    rates: &Rates,
    rng: &mut R,
) -> Result<StepOutcome, StepError> {
    let total = rates.total();
    if rates.is_absorbing() {
        return Ok(StepOutcome::Absorbed);
    }

    let waiting_time = waiting_time(total, rng)?;
    let u = rng.random::<f64>() * total;
    let Some(event) = select_event(rates, u) else {
        return Ok(StepOutcome::Absorbed);
    };

    let next = population
        .apply(event)
        .ok_or(StepError::CountUnderflow { event, population })?;

    Ok(StepOutcome::Fired(Step {
        event,
        waiting_time,
        population: next,
    }))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::cast_precision_loss
)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::config::RateConstants;
    use crate::rates::propensities;

    fn sample_rates() -> Rates {
        Rates {
            rabbit_birth: 3.0,
            rabbit_death: 4.0,
            fox_birth: 1.0,
            fox_death: 2.0,
        }
    }

    #[test]
    fn select_walks_cumulative_intervals_in_order() {
        let rates = sample_rates();
        // Order: fox_birth [0,1), fox_death [1,3), rabbit_birth [3,6), rabbit_death [6,10)
        assert_eq!(select_event(&rates, 0.0), Some(Event::FoxBirth));
        assert_eq!(select_event(&rates, 0.99), Some(Event::FoxBirth));
        assert_eq!(select_event(&rates, 1.0), Some(Event::FoxDeath));
        assert_eq!(select_event(&rates, 2.5), Some(Event::FoxDeath));
        assert_eq!(select_event(&rates, 3.5), Some(Event::RabbitBirth));
        assert_eq!(select_event(&rates, 6.0), Some(Event::RabbitDeath));
        assert_eq!(select_event(&rates, 9.999), Some(Event::RabbitDeath));
    }

    #[test]
    fn select_never_returns_zero_rate_event() {
        let rates = Rates {
            rabbit_birth: 5.0,
            rabbit_death: 0.0,
            fox_birth: 0.0,
            fox_death: 0.0,
        };
        assert_eq!(select_event(&rates, 0.0), Some(Event::RabbitBirth));
        // Rounding past the end falls back to the last positive event.
        assert_eq!(select_event(&rates, 5.0), Some(Event::RabbitBirth));
        assert_eq!(select_event(&Rates::default(), 0.0), None);
    }

    #[test]
    fn absorbed_when_all_rates_zero() {
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = step(Population::new(0, 0), &Rates::default(), &mut rng).unwrap();
        assert_eq!(outcome, StepOutcome::Absorbed);
    }

    #[test]
    fn fired_step_moves_one_count_and_positive_time() {
        let mut rng = SmallRng::seed_from_u64(42);
        let population = Population::new(400, 200);
        let rates = propensities(&RateConstants::default(), population);
        for _ in 0..1000 {
            let StepOutcome::Fired(s) = step(population, &rates, &mut rng).unwrap() else {
                panic!("reference state must not be absorbing");
            };
            assert!(s.waiting_time > 0.0);
            let dr = s.population.rabbits.abs_diff(population.rabbits);
            let df = s.population.foxes.abs_diff(population.foxes);
            assert_eq!(dr + df, 1);
        }
    }

    #[test]
    fn invalid_total_rate_is_an_error() {
        let mut rng = SmallRng::seed_from_u64(1);
        assert!(waiting_time(0.0, &mut rng).is_err());
        assert!(waiting_time(f64::NAN, &mut rng).is_err());
        assert!(waiting_time(f64::INFINITY, &mut rng).is_err());
    }

    #[test]
    fn event_frequencies_match_propensity_ratios() {
        let mut rng = SmallRng::seed_from_u64(2024);
        let rates = sample_rates();
        let total = rates.total();
        let trials = 100_000;
        let mut counts = [0_usize; 4];
        for _ in 0..trials {
            let u = rng.random::<f64>() * total;
            let event = select_event(&rates, u).unwrap();
            let slot = Event::SELECTION_ORDER
                .iter()
                .position(|e| *e == event)
                .unwrap();
            counts[slot] += 1;
        }
        for (slot, event) in Event::SELECTION_ORDER.iter().enumerate() {
            let expected = rates.of(*event) / total;
            let observed = counts[slot] as f64 / f64::from(trials);
            assert!(
                (observed - expected).abs() < 0.01,
                "{event}: observed {observed:.4}, expected {expected:.4}"
            );
        }
    }

    #[test]
    fn waiting_time_mean_is_inverse_total() {
        let mut rng = SmallRng::seed_from_u64(7);
        let total = 49.2;
        let n = 20_000;
        let sum: f64 = (0..n).map(|_| waiting_time(total, &mut rng).unwrap()).sum();
        let mean = sum / f64::from(n);
        let expected = 1.0 / total;
        assert!(
            (mean - expected).abs() / expected < 0.03,
            "mean {mean:.6} vs expected {expected:.6}"
        );
    }

    #[test]
    fn waiting_times_pass_kolmogorov_smirnov() {
        let mut rng = SmallRng::seed_from_u64(11);
        let total = 49.2;
        let n = 5_000_usize;
        let mut draws: Vec<f64> = (0..n).map(|_| waiting_time(total, &mut rng).unwrap()).collect();
        draws.sort_by(f64::total_cmp);

        let nf = n as f64;
        let d = draws
            .iter()
            .enumerate()
            .map(|(i, &x)| {
                let cdf = 1.0 - (-total * x).exp();
                let below = i as f64 / nf;
                let above = (i + 1) as f64 / nf;
                (cdf - below).max(above - cdf)
            })
            .fold(0.0_f64, f64::max);

        // Critical value at alpha = 0.001.
        let critical = 1.95 / nf.sqrt();
        assert!(d < critical, "KS statistic {d:.4} exceeds {critical:.4}");
    }
}
