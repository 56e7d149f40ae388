//! The shared ship: one mutable resource per session.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::upgrade::Upgrade;

/// The crew's starship. Hull capacity scales with crew size and the voyage
/// begins already damaged, at 70% of capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    /// Current hull points, 0..=max_hp.
    pub hp: u32,
    /// Hull capacity.
    pub max_hp: u32,
    upgrades: BTreeSet<Upgrade>,
}

impl Ship {
    /// Hull capacity for a crew of the given size.
    pub fn capacity_for(player_count: usize) -> u32 {
        match player_count {
            0..=4 => 80,
            5..=6 => 100,
            7..=10 => 120,
            _ => 140,
        }
    }

    /// A ship sized for the given crew, launching at 70% hull.
    pub fn for_crew(player_count: usize) -> Self {
        let max_hp = Self::capacity_for(player_count);
        Self {
            hp: max_hp * 7 / 10,
            max_hp,
            upgrades: BTreeSet::new(),
        }
    }

    /// Combined damage-reduction percentage from installed upgrades.
    pub fn damage_reduction_pct(&self) -> u32 {
        self.upgrades
            .iter()
            .map(|u| u.damage_reduction_pct())
            .sum()
    }

    /// Apply damage, scaled down by installed upgrades, flooring at zero.
    /// Returns the amount that actually landed.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let landed = amount * (100 - self.damage_reduction_pct().min(100)) / 100;
        self.hp = self.hp.saturating_sub(landed);
        landed
    }

    /// Restore hull points, capped at capacity.
    pub fn repair(&mut self, amount: u32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    /// Install an upgrade. Returns false if it was already installed.
    pub fn install(&mut self, upgrade: Upgrade) -> bool {
        self.upgrades.insert(upgrade)
    }

    /// Whether an upgrade is installed.
    pub fn has_upgrade(&self, upgrade: Upgrade) -> bool {
        self.upgrades.contains(&upgrade)
    }

    /// Installed upgrades, in stable order.
    pub fn upgrades(&self) -> impl Iterator<Item = Upgrade> + '_ {
        self.upgrades.iter().copied()
    }

    /// Hull points restored automatically at the end of each round.
    pub fn auto_repair_amount(&self) -> u32 {
        self.upgrades.iter().map(|u| u.auto_repair()).sum()
    }
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            hp: 100,
            max_hp: 100,
            upgrades: BTreeSet::new(),
        }
    }
}
