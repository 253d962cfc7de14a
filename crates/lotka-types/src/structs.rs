//! Core value types: population counts, event rates, samples, and peaks.

use serde::{Deserialize, Serialize};

use crate::enums::Event;

// ---------------------------------------------------------------------------
// Population
// ---------------------------------------------------------------------------

/// Current number of rabbits and foxes.
///
/// Counts are unsigned; the only way to change them is [`Population::apply`],
/// which moves exactly one count by one individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Population {
    /// Number of living rabbits.
    pub rabbits: u64,
    /// Number of living foxes.
    pub foxes: u64,
}

impl Population {
    /// Create a population with the given counts.
    pub const fn new(rabbits: u64, foxes: u64) -> Self {
        Self { rabbits, foxes }
    }

    /// Whether both populations are zero (the absorbing state).
    pub const fn is_extinct(self) -> bool {
        self.rabbits == 0 && self.foxes == 0
    }

    /// Return the population after `event` fires.
    ///
    /// Returns `None` if the event would drive a count below zero or past
    /// `u64::MAX`. Neither can happen for an event selected with a
    /// positive rate.
    pub fn apply(self, event: Event) -> Option<Self> {
        let next = match event {
            Event::FoxBirth => Self {
                foxes: self.foxes.checked_add(1)?,
                ..self
            },
            Event::FoxDeath => Self {
                foxes: self.foxes.checked_sub(1)?,
                ..self
            },
            Event::RabbitBirth => Self {
                rabbits: self.rabbits.checked_add(1)?,
                ..self
            },
            Event::RabbitDeath => Self {
                rabbits: self.rabbits.checked_sub(1)?,
                ..self
            },
        };
        Some(next)
    }
}

// ---------------------------------------------------------------------------
// Rates
// ---------------------------------------------------------------------------

/// Instantaneous propensities of the four elementary events, per day.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rates {
    /// Rabbit birth propensity (`k1 * R`).
    pub rabbit_birth: f64,
    /// Rabbit death propensity (`k2 * R * F`).
    pub rabbit_death: f64,
    /// Fox birth propensity (`k3 * R * F`).
    pub fox_birth: f64,
    /// Fox death propensity (`k4 * F`).
    pub fox_death: f64,
}

impl Rates {
    /// Propensity of a single event.
    pub const fn of(&self, event: Event) -> f64 {
        match event {
            Event::FoxBirth => self.fox_birth,
            Event::FoxDeath => self.fox_death,
            Event::RabbitBirth => self.rabbit_birth,
            Event::RabbitDeath => self.rabbit_death,
        }
    }

    /// Sum of all four propensities.
    pub fn total(&self) -> f64 {
        self.rabbit_birth + self.rabbit_death + self.fox_birth + self.fox_death
    }

    /// Whether no event can fire.
    pub fn is_absorbing(&self) -> bool {
        self.total() <= 0.0
    }

    /// `(event, rate)` pairs in selection order.
    pub fn in_selection_order(&self) -> [(Event, f64); 4] {
        Event::SELECTION_ORDER.map(|event| (event, self.of(event)))
    }
}

// ---------------------------------------------------------------------------
// Samples and peaks
// ---------------------------------------------------------------------------

/// One recorded point of a trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulated time in days.
    pub time: f64,
    /// Rabbit count at `time`.
    pub rabbits: u64,
    /// Fox count at `time`.
    pub foxes: u64,
}

impl Sample {
    /// Build a sample from a time and a population.
    pub const fn at(time: f64, population: Population) -> Self {
        Self {
            time,
            rabbits: population.rabbits,
            foxes: population.foxes,
        }
    }

    /// Population recorded in this sample.
    pub const fn population(&self) -> Population {
        Population::new(self.rabbits, self.foxes)
    }
}

/// The qualifying "second peak" of the fox population within one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Peak {
    /// Index of the peak sample in its trajectory.
    pub index: usize,
    /// Time of the peak in days.
    pub time: f64,
    /// Fox count at the peak.
    pub foxes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_moves_one_count_by_one() {
        let p = Population::new(10, 5);
        assert_eq!(p.apply(Event::FoxBirth), Some(Population::new(10, 6)));
        assert_eq!(p.apply(Event::FoxDeath), Some(Population::new(10, 4)));
        assert_eq!(p.apply(Event::RabbitBirth), Some(Population::new(11, 5)));
        assert_eq!(p.apply(Event::RabbitDeath), Some(Population::new(9, 5)));
    }

    #[test]
    fn apply_refuses_negative_counts() {
        let p = Population::new(0, 0);
        assert_eq!(p.apply(Event::FoxDeath), None);
        assert_eq!(p.apply(Event::RabbitDeath), None);
    }

    #[test]
    fn extinct_only_when_both_zero() {
        assert!(Population::new(0, 0).is_extinct());
        assert!(!Population::new(1, 0).is_extinct());
        assert!(!Population::new(0, 1).is_extinct());
    }

    #[test]
    fn rates_total_and_lookup() {
        let rates = Rates {
            rabbit_birth: 1.0,
            rabbit_death: 2.0,
            fox_birth: 3.0,
            fox_death: 4.0,
        };
        assert!((rates.total() - 10.0).abs() < 1e-12);
        assert!((rates.of(Event::FoxDeath) - 4.0).abs() < 1e-12);
        let ordered = rates.in_selection_order();
        assert_eq!(ordered[0].0, Event::FoxBirth);
        assert!((ordered[3].1 - 2.0).abs() < 1e-12);
        assert!(!rates.is_absorbing());
        assert!(Rates::default().is_absorbing());
    }
}
