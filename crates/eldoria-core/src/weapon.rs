//! Weapons: the free basic strike and the four premium weapons.

use serde::{Deserialize, Serialize};

/// Damage dealt by the basic strike available to every light-aligned player.
pub const BASIC_STRIKE_DAMAGE: u32 = 8;

/// A premium weapon with limited total uses, bought in the shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weapon {
    /// Powerful holy blade.
    HolySword,
    /// Divine spear.
    LightSpear,
    /// Blessed bow.
    DivineBow,
    /// Quick dagger.
    BlessedDagger,
}

impl Weapon {
    /// Damage per strike.
    pub fn damage(self) -> u32 {
        match self {
            Self::HolySword => 30,
            Self::LightSpear => 22,
            Self::DivineBow => 18,
            Self::BlessedDagger => 12,
        }
    }

    /// Purchase price in coins.
    pub fn cost(self) -> u32 {
        match self {
            Self::HolySword => 35,
            Self::LightSpear => 28,
            Self::DivineBow => 20,
            Self::BlessedDagger => 15,
        }
    }

    /// Total uses granted per purchase.
    pub fn uses(self) -> u32 {
        match self {
            Self::HolySword => 2,
            Self::LightSpear => 3,
            Self::DivineBow => 4,
            Self::BlessedDagger => 5,
        }
    }

    /// All premium weapons.
    pub fn all() -> &'static [Self] {
        &[
            Self::HolySword,
            Self::LightSpear,
            Self::DivineBow,
            Self::BlessedDagger,
        ]
    }
}

impl std::fmt::Display for Weapon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HolySword => write!(f, "Holy Sword"),
            Self::LightSpear => write!(f, "Light Spear"),
            Self::DivineBow => write!(f, "Divine Bow"),
            Self::BlessedDagger => write!(f, "Blessed Dagger"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stronger_weapons_cost_more() {
        let mut sorted: Vec<Weapon> = Weapon::all().to_vec();
        sorted.sort_by_key(|w| w.damage());
        for pair in sorted.windows(2) {
            assert!(pair[0].cost() <= pair[1].cost());
        }
    }

    #[test]
    fn weaker_weapons_get_more_uses() {
        assert_eq!(Weapon::HolySword.uses(), 2);
        assert_eq!(Weapon::BlessedDagger.uses(), 5);
    }
}
