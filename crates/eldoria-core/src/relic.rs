//! Relics found by the Explorer: passive boons and one-time consumables.

use serde::{Deserialize, Serialize};

/// A relic identifier. Each player may hold at most one of each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Relic {
    /// Whispers a piece of intel to its holder every round.
    CrystalOfClarity,
    /// Flat reduction on incoming damage.
    ShieldOfStars,
    /// Improves the holder's dodge chance.
    AmuletOfProtection,
    /// Adds damage to the holder's attacks.
    SwordOfLight,
    /// Consumed for a burst of healing.
    HealingHerb,
    /// Consumed for a purse of coins.
    AncientScroll,
}

/// The mechanical effect of a relic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RelicEffect {
    /// Passive: subtract this much from incoming damage.
    DamageReduction(u32),
    /// Passive: add this much to the holder's dodge chance.
    DodgeBonus(f64),
    /// Passive: add this much to the holder's attack damage.
    DamageBonus(u32),
    /// Passive: the holder receives a private intel line each round.
    DailyIntel,
    /// One-time: restore this many hit points when used.
    Heal(u32),
    /// One-time: grant this many coins when used.
    Coins(u32),
}

impl Relic {
    /// The relic's effect.
    pub fn effect(self) -> RelicEffect {
        match self {
            Self::CrystalOfClarity => RelicEffect::DailyIntel,
            Self::ShieldOfStars => RelicEffect::DamageReduction(10),
            Self::AmuletOfProtection => RelicEffect::DodgeBonus(0.25),
            Self::SwordOfLight => RelicEffect::DamageBonus(15),
            Self::HealingHerb => RelicEffect::Heal(15),
            Self::AncientScroll => RelicEffect::Coins(20),
        }
    }

    /// True for relics that work without being used up.
    pub fn is_passive(self) -> bool {
        !matches!(self.effect(), RelicEffect::Heal(_) | RelicEffect::Coins(_))
    }

    /// All relics, in search order.
    pub fn all() -> &'static [Self] {
        &[
            Self::CrystalOfClarity,
            Self::ShieldOfStars,
            Self::AmuletOfProtection,
            Self::SwordOfLight,
            Self::HealingHerb,
            Self::AncientScroll,
        ]
    }
}

impl std::fmt::Display for Relic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CrystalOfClarity => write!(f, "Crystal of Clarity"),
            Self::ShieldOfStars => write!(f, "Shield of Stars"),
            Self::AmuletOfProtection => write!(f, "Amulet of Protection"),
            Self::SwordOfLight => write!(f, "Sword of Light"),
            Self::HealingHerb => write!(f, "Healing Herb"),
            Self::AncientScroll => write!(f, "Ancient Scroll"),
        }
    }
}
