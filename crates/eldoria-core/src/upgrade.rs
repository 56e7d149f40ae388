//! Permanent ship upgrades funded collectively by the crew.

use serde::{Deserialize, Serialize};

/// A ship upgrade. Installed once its funding pool reaches the cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Upgrade {
    /// Reduces all ship damage by a flat percentage.
    ReinforcedHull,
    /// Sharpens the Oracle's forecasts.
    AdvancedScanners,
    /// Repairs the hull a little at the end of every round.
    AutoRepairSystem,
}

impl Upgrade {
    /// Total coins required to install.
    pub fn cost(self) -> u32 {
        match self {
            Self::ReinforcedHull => 100,
            Self::AdvancedScanners => 80,
            Self::AutoRepairSystem => 120,
        }
    }

    /// Percentage knocked off incoming ship damage once installed.
    pub fn damage_reduction_pct(self) -> u32 {
        match self {
            Self::ReinforcedHull => 10,
            _ => 0,
        }
    }

    /// Hull points restored automatically at the end of each round.
    pub fn auto_repair(self) -> u32 {
        match self {
            Self::AutoRepairSystem => 5,
            _ => 0,
        }
    }

    /// All upgrades.
    pub fn all() -> &'static [Self] {
        &[
            Self::ReinforcedHull,
            Self::AdvancedScanners,
            Self::AutoRepairSystem,
        ]
    }
}

impl std::fmt::Display for Upgrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReinforcedHull => write!(f, "Reinforced Hull"),
            Self::AdvancedScanners => write!(f, "Advanced Scanners"),
            Self::AutoRepairSystem => write!(f, "Auto-Repair System"),
        }
    }
}
