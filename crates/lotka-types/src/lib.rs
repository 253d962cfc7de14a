//! Shared type definitions for the Lotka predator-prey ensemble.
//!
//! This crate is the single source of truth for the values that flow
//! between the stochastic simulator, the ensemble aggregator, and anything
//! that consumes their output (exporters, plotting tools).
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for campaign identifiers
//! - [`enums`] -- Elementary events and run termination states
//! - [`structs`] -- Population counts, event rates, samples, and peaks
//! - [`trajectory`] -- Column-oriented record of one stochastic run

pub mod enums;
pub mod ids;
pub mod structs;
pub mod trajectory;

// Re-export all public types at crate root for convenience.
pub use enums::{Event, Termination};
pub use ids::CampaignId;
pub use structs::{Peak, Population, Rates, Sample};
pub use trajectory::Trajectory;
