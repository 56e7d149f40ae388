//! Crew roles, alignment, and the per-player-count role shape table.

use serde::{Deserialize, Serialize};

/// Which side a role fights for. Win conditions group players by alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    /// The crew trying to deliver the potion.
    Light,
    /// The saboteurs trying to sink the voyage.
    Dark,
}

/// A player's secret role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Leads the crew; mitigates ship damage and can rally the team.
    Captain,
    /// Heals other players and repairs the ship.
    Healer,
    /// Reads the omens; forecasts hazards and monster attacks.
    Oracle,
    /// Shields the crew from monster collateral damage.
    DragonRider,
    /// Guards the potion bearer once the potion appears.
    AngelGuardian,
    /// Searches for relics.
    Explorer,
    /// Ordinary crew; can brace to dodge.
    CrewMember,
    /// Hidden villain; sabotages until unmasked, then transforms.
    Betrayer,
    /// The Betrayer's revealed form; attacks the ship and crew every round.
    EpicMonster,
    /// Villain who blocks one player's action each round.
    ShadowSaboteur,
    /// Villain who can permanently empower the monster once per game.
    DevilHunter,
}

impl Role {
    /// The alignment this role belongs to.
    pub fn alignment(self) -> Alignment {
        match self {
            Self::Betrayer | Self::EpicMonster | Self::ShadowSaboteur | Self::DevilHunter => {
                Alignment::Dark
            }
            _ => Alignment::Light,
        }
    }

    /// True for the villain roles.
    pub fn is_dark(self) -> bool {
        self.alignment() == Alignment::Dark
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Captain => write!(f, "Captain"),
            Self::Healer => write!(f, "Healer"),
            Self::Oracle => write!(f, "Oracle"),
            Self::DragonRider => write!(f, "Dragon Rider"),
            Self::AngelGuardian => write!(f, "Angel Guardian"),
            Self::Explorer => write!(f, "Explorer"),
            Self::CrewMember => write!(f, "Crew Member"),
            Self::Betrayer => write!(f, "Betrayer"),
            Self::EpicMonster => write!(f, "Epic Monster"),
            Self::ShadowSaboteur => write!(f, "Shadow Saboteur"),
            Self::DevilHunter => write!(f, "Devil Hunter"),
        }
    }
}

/// The balanced role multiset for a given player count.
///
/// Distinct shapes are defined for 4 through 10 players; larger games use
/// the 11-player shape (which adds a second Betrayer) padded with crew
/// members. Every shape contains at least one Betrayer and the result
/// always has exactly `player_count` entries.
pub fn role_shape(player_count: usize) -> Vec<Role> {
    use Role::*;
    let mut shape = match player_count {
        0..=4 => vec![Captain, Healer, Betrayer, CrewMember],
        5 => vec![Captain, Healer, Betrayer, ShadowSaboteur, CrewMember],
        6 => vec![Captain, Healer, Explorer, Betrayer, ShadowSaboteur, CrewMember],
        7 => vec![
            Captain,
            Healer,
            Explorer,
            DragonRider,
            Betrayer,
            ShadowSaboteur,
            CrewMember,
        ],
        8 => vec![
            Captain,
            Healer,
            Oracle,
            Explorer,
            DragonRider,
            Betrayer,
            ShadowSaboteur,
            CrewMember,
        ],
        9 => vec![
            Captain,
            Healer,
            Oracle,
            Explorer,
            DragonRider,
            AngelGuardian,
            Betrayer,
            ShadowSaboteur,
            CrewMember,
        ],
        10 => vec![
            Captain,
            Healer,
            Oracle,
            Explorer,
            DragonRider,
            AngelGuardian,
            Betrayer,
            ShadowSaboteur,
            DevilHunter,
            CrewMember,
        ],
        _ => vec![
            Captain,
            Healer,
            Oracle,
            Explorer,
            DragonRider,
            AngelGuardian,
            Betrayer,
            Betrayer,
            ShadowSaboteur,
            DevilHunter,
            CrewMember,
        ],
    };
    while shape.len() < player_count {
        shape.push(CrewMember);
    }
    shape
}
