//! Tuning constants for a voyage.

use serde::{Deserialize, Serialize};

/// Tuning knobs for a single game session.
///
/// The defaults reproduce the standard 13-round campaign. Hosts normally
/// only override `seed` (for reproducible games) and the window lengths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Minimum players required to start.
    pub min_players: usize,
    /// Maximum players a lobby accepts.
    pub max_players: usize,
    /// Total rounds in the campaign.
    pub total_rounds: u32,
    /// Round on which the potion appears and the hidden Betrayer transforms.
    pub potion_round: u32,
    /// Seconds the action-collection window stays open.
    pub action_window_secs: i64,
    /// Seconds the voting window stays open.
    pub voting_window_secs: i64,
    /// Chance per round (after round 3) of a divine intervention heal.
    pub divine_intervention_chance: f64,
    /// Chance per round of drawing an environmental event for the next round.
    pub environment_event_chance: f64,
    /// Chance of a hull hazard during Voyage-phase rounds.
    pub hazard_chance: f64,
    /// Hit points restored by a heal action.
    pub heal_amount: u32,
    /// Hull points restored by a repair action.
    pub repair_amount: u32,
    /// Hit points restored to each light player by divine intervention.
    pub divine_heal_amount: u32,
    /// Hit points restored to every living player by a captain's rally.
    pub rally_heal_amount: u32,
    /// Rally charges granted to the Captain at role assignment.
    pub rally_charges: u32,
    /// Coins granted to every living player at the end of each round.
    pub daily_income: u32,
    /// Rounds an unhealed collateral wound persists before it turns fatal.
    pub collateral_rounds: u32,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: 4,
            max_players: 21,
            total_rounds: 13,
            potion_round: 10,
            action_window_secs: 45,
            voting_window_secs: 45,
            divine_intervention_chance: 0.5,
            environment_event_chance: 0.25,
            hazard_chance: 0.5,
            heal_amount: 15,
            repair_amount: 11,
            divine_heal_amount: 15,
            rally_heal_amount: 10,
            rally_charges: 2,
            daily_income: 10,
            collateral_rounds: 4,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set both collection windows to the same length in seconds.
    pub fn with_windows(mut self, secs: i64) -> Self {
        self.action_window_secs = secs;
        self.voting_window_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.min_players, 4);
        assert_eq!(cfg.max_players, 21);
        assert_eq!(cfg.total_rounds, 13);
        assert_eq!(cfg.potion_round, 10);
        assert_eq!(cfg.collateral_rounds, 4);
        assert!(cfg.seed.is_none());
    }

    #[test]
    fn builder_methods() {
        let cfg = GameConfig::default().with_seed(7).with_windows(5);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.action_window_secs, 5);
        assert_eq!(cfg.voting_window_secs, 5);
    }
}
