//! Enumeration types for the predator-prey process.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Elementary events
// ---------------------------------------------------------------------------

/// One of the four competing elementary events of the process.
///
/// Each event changes exactly one population count by one individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A fox is born after eating a rabbit (`foxes + 1`).
    FoxBirth,
    /// A fox dies (`foxes - 1`).
    FoxDeath,
    /// A rabbit is born (`rabbits + 1`).
    RabbitBirth,
    /// A rabbit is eaten by a fox (`rabbits - 1`).
    RabbitDeath,
}

impl Event {
    /// Order in which cumulative propensity mass is consumed during
    /// event selection.
    pub const SELECTION_ORDER: [Self; 4] = [
        Self::FoxBirth,
        Self::FoxDeath,
        Self::RabbitBirth,
        Self::RabbitDeath,
    ];
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::FoxBirth => "fox_birth",
            Self::FoxDeath => "fox_death",
            Self::RabbitBirth => "rabbit_birth",
            Self::RabbitDeath => "rabbit_death",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Run termination
// ---------------------------------------------------------------------------

/// Terminal state of a single stochastic run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Both populations reached zero before the horizon; no event can fire.
    Absorbed,
    /// Simulated time reached the horizon.
    HorizonReached,
}

impl Termination {
    /// Whether the run ended in the absorbing all-dead state.
    pub const fn is_absorbed(self) -> bool {
        matches!(self, Self::Absorbed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_order_covers_every_event_once() {
        let mut order = Event::SELECTION_ORDER.to_vec();
        order.sort();
        order.dedup();
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn event_serializes_snake_case() {
        let json = serde_json::to_string(&Event::RabbitDeath).unwrap_or_default();
        assert_eq!(json, "\"rabbit_death\"");
        assert_eq!(Event::FoxBirth.to_string(), "fox_birth");
    }
}
