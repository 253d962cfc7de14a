//! Stochastic simulation and ensemble statistics for the Lotka
//! predator-prey model.
//!
//! Rabbits and foxes change one individual at a time through four
//! competing events whose propensities depend on the current counts. This
//! crate simulates that continuous-time Markov jump process exactly
//! (Gillespie direct method), finds the second fox peak of each run, and
//! aggregates running statistics over an ensemble of runs.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `lotka-config.yaml` into
//!   strongly-typed, validated structs.
//! - [`rates`] -- Event propensities from population counts.
//! - [`stepper`] -- Exponential waiting time and proportional event
//!   selection for one step.
//! - [`run`] -- One trajectory from the initial state to the horizon or
//!   absorption.
//! - [`peak`] -- Second-peak detection over a finished trajectory.
//! - [`stats`] -- Mean and linear-interpolation percentiles.
//! - [`ensemble`] -- [`Ensemble`] driver, [`CampaignStatistics`], and the
//!   [`RunObserver`] trait.
//! - [`report`] -- Serializable [`CampaignReport`].
//!
//! [`Ensemble`]: ensemble::Ensemble
//! [`CampaignStatistics`]: ensemble::CampaignStatistics
//! [`RunObserver`]: ensemble::RunObserver
//! [`CampaignReport`]: report::CampaignReport

pub mod config;
pub mod ensemble;
pub mod peak;
pub mod rates;
pub mod report;
pub mod run;
pub mod stats;
pub mod stepper;
