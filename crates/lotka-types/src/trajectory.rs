//! Column-oriented record of one stochastic run.
//!
//! Samples are kept as three parallel columns (`times`, `rabbits`,
//! `foxes`) so plotting tools and the peak scan can walk a single column
//! without unpacking rows.

use serde::{Deserialize, Serialize};

use crate::structs::{Population, Sample};

/// Ordered `(time, rabbits, foxes)` samples of one run.
///
/// The columns always have equal length. The first sample is the initial
/// state; each accepted event appends one sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    times: Vec<f64>,
    rabbits: Vec<u64>,
    foxes: Vec<u64>,
}

impl Trajectory {
    /// Start a trajectory with a single initial sample.
    pub fn starting_at(time: f64, population: Population) -> Self {
        let mut trajectory = Self::default();
        trajectory.push(Sample::at(time, population));
        trajectory
    }

    /// Append a sample.
    pub fn push(&mut self, sample: Sample) {
        self.times.push(sample.time);
        self.rabbits.push(sample.rabbits);
        self.foxes.push(sample.foxes);
    }

    /// Number of recorded samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether no sample has been recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time column.
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Rabbit column.
    pub fn rabbits(&self) -> &[u64] {
        &self.rabbits
    }

    /// Fox column.
    pub fn foxes(&self) -> &[u64] {
        &self.foxes
    }

    /// Sample at index `i`, if recorded.
    pub fn get(&self, i: usize) -> Option<Sample> {
        Some(Sample {
            time: *self.times.get(i)?,
            rabbits: *self.rabbits.get(i)?,
            foxes: *self.foxes.get(i)?,
        })
    }

    /// First recorded sample.
    pub fn first(&self) -> Option<Sample> {
        self.get(0)
    }

    /// Last recorded sample.
    pub fn last(&self) -> Option<Sample> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Time of the last sample (`0.0` when empty).
    pub fn final_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Population of the last sample.
    pub fn final_population(&self) -> Option<Population> {
        self.last().map(|s| s.population())
    }

    /// Iterator over all samples in order.
    pub fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.times
            .iter()
            .zip(&self.rabbits)
            .zip(&self.foxes)
            .map(|((&time, &rabbits), &foxes)| Sample {
                time,
                rabbits,
                foxes,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_initial_sample() {
        let t = Trajectory::starting_at(0.0, Population::new(400, 200));
        assert_eq!(t.len(), 1);
        let first = t.first();
        assert_eq!(first.map(|s| s.population()), Some(Population::new(400, 200)));
    }

    #[test]
    fn columns_stay_aligned() {
        let mut t = Trajectory::starting_at(0.0, Population::new(1, 1));
        t.push(Sample {
            time: 0.5,
            rabbits: 2,
            foxes: 1,
        });
        t.push(Sample {
            time: 1.5,
            rabbits: 2,
            foxes: 0,
        });
        assert_eq!(t.times().len(), t.rabbits().len());
        assert_eq!(t.rabbits().len(), t.foxes().len());
        assert_eq!(t.samples().count(), 3);
        assert!((t.final_time() - 1.5).abs() < 1e-12);
        assert_eq!(t.final_population(), Some(Population::new(2, 0)));
        assert_eq!(t.get(3), None);
    }

    #[test]
    fn empty_trajectory() {
        let t = Trajectory::default();
        assert!(t.is_empty());
        assert_eq!(t.last(), None);
        assert!(t.final_time().abs() < f64::EPSILON);
    }
}
