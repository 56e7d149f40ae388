//! Secret per-player objectives.
//!
//! Each objective is a declarative condition descriptor (a goal kind plus a
//! numeric target) interpreted by the engine at the end of every round's
//! resolution. No objective embeds executable code.

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// What an objective asks the player to do. Progress semantics per kind:
/// everything except `SurviveUntilRound` compares a running counter against
/// the target; survival compares the current round number instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveGoal {
    /// Heal this many distinct other players.
    HealDistinctPlayers,
    /// Find this many relics.
    CollectRelics,
    /// Rally the team this many times.
    RallyTeam,
    /// Deal this much cumulative sabotage damage to the ship.
    SabotageDamage,
    /// Still be alive when this round arrives.
    SurviveUntilRound,
}

/// The one-time reward granted on completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveReward {
    /// The player's heals are half again as strong from now on.
    HealBoost,
    /// One free shield charge.
    FreeShield,
    /// A coin grant.
    Coins(u32),
    /// An immediate hit-point boost (clamped to max hp).
    HpBoost(u32),
}

/// A secret objective descriptor: goal, target threshold, and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    /// The kind of condition to satisfy.
    pub goal: ObjectiveGoal,
    /// Threshold the progress counter (or round number) must reach.
    pub target: u32,
    /// Reward granted exactly once on completion.
    pub reward: ObjectiveReward,
}

impl ObjectiveSpec {
    /// Player-facing description of the objective.
    pub fn description(&self) -> String {
        match self.goal {
            ObjectiveGoal::HealDistinctPlayers => {
                format!("Heal {} different players.", self.target)
            }
            ObjectiveGoal::CollectRelics => format!("Find {} relics.", self.target),
            ObjectiveGoal::RallyTeam => {
                format!("Successfully use Rally Team {} times.", self.target)
            }
            ObjectiveGoal::SabotageDamage => format!(
                "Successfully sabotage the ship for a total of {} damage.",
                self.target
            ),
            ObjectiveGoal::SurviveUntilRound => {
                format!("Survive until Day {}.", self.target)
            }
        }
    }
}

/// The secret objective looked up for a role. Roles without a bespoke entry
/// share the survival objective.
pub fn objective_for(role: Role) -> ObjectiveSpec {
    match role {
        Role::Healer => ObjectiveSpec {
            goal: ObjectiveGoal::HealDistinctPlayers,
            target: 3,
            reward: ObjectiveReward::HealBoost,
        },
        Role::Explorer => ObjectiveSpec {
            goal: ObjectiveGoal::CollectRelics,
            target: 2,
            reward: ObjectiveReward::FreeShield,
        },
        Role::Captain => ObjectiveSpec {
            goal: ObjectiveGoal::RallyTeam,
            target: 2,
            reward: ObjectiveReward::Coins(50),
        },
        Role::Betrayer => ObjectiveSpec {
            goal: ObjectiveGoal::SabotageDamage,
            target: 50,
            reward: ObjectiveReward::HpBoost(20),
        },
        _ => ObjectiveSpec {
            goal: ObjectiveGoal::SurviveUntilRound,
            target: 8,
            reward: ObjectiveReward::Coins(30),
        },
    }
}

/// A player's objective with its progress state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Objective {
    /// The descriptor being tracked.
    pub spec: ObjectiveSpec,
    /// Running counter (distinct heals, relics found, rallies, damage).
    pub progress: u32,
    /// Set once, when the reward is granted.
    pub completed: bool,
}

impl Objective {
    /// Track a fresh objective.
    pub fn new(spec: ObjectiveSpec) -> Self {
        Self {
            spec,
            progress: 0,
            completed: false,
        }
    }

    /// Whether the condition is currently satisfied.
    ///
    /// `current_round` feeds the survival goal; the others compare the
    /// progress counter.
    pub fn satisfied(&self, current_round: u32) -> bool {
        match self.spec.goal {
            ObjectiveGoal::SurviveUntilRound => current_round >= self.spec.target,
            _ => self.progress >= self.spec.target,
        }
    }
}
