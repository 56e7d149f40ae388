//! Core types for Eldoria: players, the shared ship, crew roles, secret
//! objectives, and the item/relic/upgrade tables.
//!
//! Everything in this crate is plain data plus pure mutation operations.
//! Orchestration (sessions, rounds, voting) lives in `eldoria-engine`.

pub mod config;
pub mod event;
pub mod objective;
pub mod player;
pub mod relic;
pub mod role;
pub mod ship;
pub mod shop;
pub mod upgrade;
pub mod weapon;

pub use config::GameConfig;
pub use event::EnvironmentEvent;
pub use objective::{Objective, ObjectiveGoal, ObjectiveReward, ObjectiveSpec};
pub use player::{PLAYER_MAX_HP, Player, PlayerId, RoundState};
pub use relic::{Relic, RelicEffect};
pub use role::{Alignment, Role};
pub use ship::Ship;
pub use shop::ShopItem;
pub use upgrade::Upgrade;
pub use weapon::{BASIC_STRIKE_DAMAGE, Weapon};
