//! Environmental events and hazard flavor tables.

use serde::{Deserialize, Serialize};

/// A random environmental event drawn at the end of a round. It modifies
/// the following round and is cleared when that round resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentEvent {
    /// Jammed communications: all actions are reported anonymously.
    CosmicFlare,
    /// A smuggler docks: black-market items are purchasable for one round.
    BlackMarket,
    /// Dark empowerment: sabotage and monster attacks deal double damage.
    TraitorsMoon,
}

impl EnvironmentEvent {
    /// Player-facing description of the event.
    pub fn description(self) -> &'static str {
        match self {
            Self::CosmicFlare => {
                "A solar flare jams all communications! All actions today will be anonymous."
            }
            Self::BlackMarket => {
                "A smuggler is nearby! Special powerful items are available in the shop for one day only."
            }
            Self::TraitorsMoon => {
                "A dark moon empowers evil! All sabotage and monster attacks are twice as powerful today."
            }
        }
    }

    /// All environmental events.
    pub fn all() -> &'static [Self] {
        &[Self::CosmicFlare, Self::BlackMarket, Self::TraitorsMoon]
    }
}

impl std::fmt::Display for EnvironmentEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CosmicFlare => write!(f, "Cosmic Flare"),
            Self::BlackMarket => write!(f, "Black Market"),
            Self::TraitorsMoon => write!(f, "Traitor's Moon"),
        }
    }
}

/// Names of hull hazards rolled during Voyage-phase rounds.
pub const HAZARDS: &[&str] = &[
    "Cosmic Storm",
    "Meteor Shower",
    "Solar Flare",
    "Dimensional Rift",
];

/// Anonymous tips planted by a Betrayer's false intel.
pub const FALSE_INTEL_TIPS: &[&str] = &[
    "Someone saw a crew member near the engine room...",
    "Strange noises were heard from the cargo bay...",
    "A player was acting suspiciously...",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptions_are_distinct() {
        let all = EnvironmentEvent::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.description(), b.description());
            }
        }
    }

    #[test]
    fn tables_are_populated() {
        assert!(!HAZARDS.is_empty());
        assert!(!FALSE_INTEL_TIPS.is_empty());
    }
}
