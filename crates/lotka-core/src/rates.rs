//! Event propensities as a function of the current population.
//!
//! Mass-action kinetics for the four elementary events:
//!
//! | Event        | Propensity    |
//! |--------------|---------------|
//! | rabbit birth | `k1 * R`      |
//! | rabbit death | `k2 * R * F`  |
//! | fox birth    | `k3 * R * F`  |
//! | fox death    | `k4 * F`      |
//!
//! With all constants positive, every propensity is zero only at
//! `(R, F) = (0, 0)`, which makes that the unique absorbing state.

use lotka_types::{Population, Rates};

use crate::config::RateConstants;

/// Compute the four propensities for `population`.
///
/// Pure and total: any pair of counts yields finite, non-negative rates
/// for finite, non-negative constants.
#[allow(clippy::cast_precision_loss)]
pub fn propensities(constants: &RateConstants, population: Population) -> Rates {
    let rabbits = population.rabbits as f64;
    let foxes = population.foxes as f64;
    let encounters = rabbits * foxes;
    Rates {
        rabbit_birth: constants.rabbit_birth * rabbits,
        rabbit_death: constants.rabbit_death * encounters,
        fox_birth: constants.fox_birth * encounters,
        fox_death: constants.fox_death * foxes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * b.abs().max(1.0)
    }

    #[test]
    fn reference_initial_state() {
        let rates = propensities(&RateConstants::default(), Population::new(400, 200));
        assert!(close(rates.rabbit_birth, 6.0));
        assert!(close(rates.rabbit_death, 3.2));
        assert!(close(rates.fox_birth, 32.0));
        assert!(close(rates.fox_death, 8.0));
        assert!(close(rates.total(), 49.2));
    }

    #[test]
    fn zero_only_at_origin() {
        let constants = RateConstants::default();
        assert!(propensities(&constants, Population::new(0, 0)).is_absorbing());
        assert!(!propensities(&constants, Population::new(1, 0)).is_absorbing());
        assert!(!propensities(&constants, Population::new(0, 1)).is_absorbing());
    }

    #[test]
    fn death_rate_vanishes_with_its_population() {
        let constants = RateConstants::default();
        let no_foxes = propensities(&constants, Population::new(50, 0));
        assert!(no_foxes.fox_death.abs() < f64::EPSILON);
        assert!(no_foxes.fox_birth.abs() < f64::EPSILON);
        assert!(no_foxes.rabbit_death.abs() < f64::EPSILON);

        let no_rabbits = propensities(&constants, Population::new(0, 50));
        assert!(no_rabbits.rabbit_birth.abs() < f64::EPSILON);
        assert!(no_rabbits.rabbit_death.abs() < f64::EPSILON);
        assert!(no_rabbits.fox_death > 0.0);
    }

    #[test]
    fn rates_are_non_negative_over_a_grid() {
        let constants = RateConstants::default();
        for rabbits in (0..5000).step_by(499) {
            for foxes in (0..5000).step_by(713) {
                let rates = propensities(&constants, Population::new(rabbits, foxes));
                for (_, rate) in rates.in_selection_order() {
                    assert!(rate >= 0.0 && rate.is_finite());
                }
            }
        }
    }
}
