//! The coin shop, including the black-market stock that only appears while
//! a smuggler event is active.

use serde::{Deserialize, Serialize};

use crate::weapon::Weapon;

/// Hit points restored by a healing potion.
pub const HEALING_POTION_RESTORE: u32 = 30;
/// Ship damage dealt by a sabotage kit.
pub const SABOTAGE_KIT_DAMAGE: u32 = 20;
/// Hull points restored by an emergency shield.
pub const EMERGENCY_SHIELD_REPAIR: u32 = 50;

/// An item purchasable with coins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShopItem {
    /// Restores hit points immediately.
    HealingPotion,
    /// Adds one shield charge.
    Shield,
    /// Reveals a random other player's role to the buyer.
    VisionCrystal,
    /// A premium weapon with limited charges.
    Weapon(Weapon),
    /// Black market: deals anonymous ship damage.
    SabotageKit,
    /// Black market: patches the hull.
    EmergencyShield,
}

impl ShopItem {
    /// Purchase price in coins.
    pub fn cost(self) -> u32 {
        match self {
            Self::HealingPotion => 15,
            Self::Shield => 20,
            Self::VisionCrystal => 25,
            Self::Weapon(w) => w.cost(),
            Self::SabotageKit => 40,
            Self::EmergencyShield => 50,
        }
    }

    /// True for items only stocked while the Black Market event is active.
    pub fn is_black_market(self) -> bool {
        matches!(self, Self::SabotageKit | Self::EmergencyShield)
    }

    /// Every item the shop can ever stock.
    pub fn all() -> &'static [Self] {
        &[
            Self::HealingPotion,
            Self::Shield,
            Self::VisionCrystal,
            Self::Weapon(Weapon::HolySword),
            Self::Weapon(Weapon::LightSpear),
            Self::Weapon(Weapon::DivineBow),
            Self::Weapon(Weapon::BlessedDagger),
            Self::SabotageKit,
            Self::EmergencyShield,
        ]
    }
}

impl std::fmt::Display for ShopItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HealingPotion => write!(f, "Healing Potion"),
            Self::Shield => write!(f, "Shield"),
            Self::VisionCrystal => write!(f, "Vision Crystal"),
            Self::Weapon(w) => write!(f, "{w}"),
            Self::SabotageKit => write!(f, "Sabotage Kit"),
            Self::EmergencyShield => write!(f, "Emergency Shield"),
        }
    }
}
