//! The coin economy: shop purchases, one-time relic use, and collective
//! ship-upgrade funding.

use rand::Rng;

use eldoria_core::relic::RelicEffect;
use eldoria_core::shop::{EMERGENCY_SHIELD_REPAIR, HEALING_POTION_RESTORE, SABOTAGE_KIT_DAMAGE};
use eldoria_core::{EnvironmentEvent, PlayerId, Relic, ShopItem, Upgrade};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::session::{Phase, Session};

/// The result of one upgrade contribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeReceipt {
    /// Coins the player donated (their whole balance).
    pub donated: u32,
    /// Total accumulated for this upgrade so far.
    pub total: u32,
    /// Whether this contribution completed the funding and installed it.
    pub installed: bool,
}

impl Session {
    /// Buy a shop item. Black-market stock is only purchasable while the
    /// smuggler event is active. Returns a line describing the effect.
    pub fn buy_item(&mut self, buyer: PlayerId, item: ShopItem) -> EngineResult<String> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.phase == Phase::Lobby {
            return Err(EngineError::InvalidOperation(
                "the shop opens once the voyage starts".into(),
            ));
        }
        if item.is_black_market() && self.active_event != Some(EnvironmentEvent::BlackMarket) {
            return Err(EngineError::InvalidOperation(
                "that item is not on the shelves today".into(),
            ));
        }
        let cost = item.cost();
        {
            let p = self
                .players
                .get(&buyer)
                .ok_or_else(|| EngineError::NotFound(format!("player {buyer}")))?;
            if !p.alive {
                return Err(EngineError::InvalidOperation("the dead cannot shop".into()));
            }
            if p.coins < cost {
                return Err(EngineError::InvalidOperation("not enough coins".into()));
            }
        }

        let message = match item {
            ShopItem::HealingPotion => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                    p.heal(HEALING_POTION_RESTORE);
                }
                format!("Restored {HEALING_POTION_RESTORE} HP!")
            }
            ShopItem::Shield => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                    p.shields += 1;
                }
                "Shield activated!".to_string()
            }
            ShopItem::VisionCrystal => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                }
                let others: Vec<PlayerId> = self
                    .join_order
                    .iter()
                    .copied()
                    .filter(|id| {
                        *id != buyer && self.players.get(id).is_some_and(|p| p.role.is_some())
                    })
                    .collect();
                if others.is_empty() {
                    "No other players to reveal!".to_string()
                } else {
                    let picked = others[self.rng.random_range(0..others.len())];
                    let p = &self.players[&picked];
                    let role = p.role.map(|r| r.to_string()).unwrap_or_default();
                    format!("Vision revealed: {} is {role}", p.name)
                }
            }
            ShopItem::Weapon(weapon) => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                    *p.weapons.entry(weapon).or_insert(0) += weapon.uses();
                }
                format!("{weapon} acquired ({} uses)", weapon.uses())
            }
            ShopItem::SabotageKit => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                }
                let mitigated = self.captain_mitigated(SABOTAGE_KIT_DAMAGE);
                let landed = self.ship.take_damage(mitigated);
                format!("The hull shudders: {landed} damage, and nobody saw a thing.")
            }
            ShopItem::EmergencyShield => {
                if let Some(p) = self.players.get_mut(&buyer) {
                    p.coins -= cost;
                }
                self.ship.repair(EMERGENCY_SHIELD_REPAIR);
                format!("Emergency plating installed: +{EMERGENCY_SHIELD_REPAIR} hull.")
            }
        };
        Ok(message)
    }

    /// Use a one-time relic, consuming it. Passive relics cannot be "used";
    /// they apply on their own.
    pub fn use_relic(&mut self, player_id: PlayerId, relic: Relic) -> EngineResult<String> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        let p = self
            .players
            .get_mut(&player_id)
            .ok_or_else(|| EngineError::NotFound(format!("player {player_id}")))?;
        if !p.alive {
            return Err(EngineError::InvalidOperation(
                "the dead cannot use relics".into(),
            ));
        }
        if !p.relics.contains(&relic) {
            return Err(EngineError::InvalidOperation(format!(
                "you do not hold the {relic}"
            )));
        }
        let message = match relic.effect() {
            RelicEffect::Heal(amount) => {
                p.heal(amount);
                format!("The {relic} restores {amount} HP.")
            }
            RelicEffect::Coins(amount) => {
                p.coins += amount;
                format!("The {relic} yields {amount} coins.")
            }
            _ => {
                return Err(EngineError::InvalidOperation(
                    "passive relics are always active".into(),
                ));
            }
        };
        p.relics.retain(|r| *r != relic);
        Ok(message)
    }

    /// Donate the player's entire coin balance toward a ship upgrade.
    /// Once the pool reaches the cost the upgrade installs permanently.
    pub fn contribute_upgrade(
        &mut self,
        player_id: PlayerId,
        upgrade: Upgrade,
    ) -> EngineResult<UpgradeReceipt> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.phase == Phase::Lobby {
            return Err(EngineError::InvalidOperation(
                "upgrades open once the voyage starts".into(),
            ));
        }
        if self.ship.has_upgrade(upgrade) {
            return Err(EngineError::InvalidOperation(format!(
                "the {upgrade} is already installed"
            )));
        }
        let donated = {
            let p = self
                .players
                .get_mut(&player_id)
                .ok_or_else(|| EngineError::NotFound(format!("player {player_id}")))?;
            if !p.alive {
                return Err(EngineError::InvalidOperation(
                    "the dead cannot contribute".into(),
                ));
            }
            if p.coins == 0 {
                return Err(EngineError::InvalidOperation(
                    "you have no coins to contribute".into(),
                ));
            }
            let donated = p.coins;
            p.coins = 0;
            donated
        };

        let total = {
            let pool = self.upgrade_pool.entry(upgrade).or_insert(0);
            *pool += donated;
            *pool
        };
        let installed = total >= upgrade.cost() && self.ship.install(upgrade);
        if installed {
            log::info!("session {}: {upgrade} installed", self.key);
        }
        Ok(UpgradeReceipt {
            donated,
            total,
            installed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKey;
    use chrono::Utc;
    use eldoria_core::{GameConfig, Weapon};

    fn shopping_session() -> Session {
        let mut s = Session::new(SessionKey(-6), GameConfig::default().with_seed(13));
        for i in 1..=4 {
            s.join(PlayerId(i), format!("Player {i}")).unwrap();
        }
        s.start(Utc::now()).unwrap();
        for p in s.players.values_mut() {
            p.coins = 60;
        }
        s
    }

    #[test]
    fn shop_is_closed_in_the_lobby() {
        let mut s = Session::new(SessionKey(-6), GameConfig::default().with_seed(13));
        s.join(PlayerId(1), "Ada").unwrap();
        assert!(matches!(
            s.buy_item(PlayerId(1), ShopItem::Shield),
            Err(EngineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn purchases_deduct_and_apply() {
        let mut s = shopping_session();
        s.players.get_mut(&PlayerId(1)).unwrap().hp = 50;
        let msg = s.buy_item(PlayerId(1), ShopItem::HealingPotion).unwrap();
        assert!(msg.contains("30"));
        let p = s.player(PlayerId(1)).unwrap();
        assert_eq!(p.coins, 45);
        assert_eq!(p.hp, 80);

        s.buy_item(PlayerId(2), ShopItem::Shield).unwrap();
        assert_eq!(s.player(PlayerId(2)).unwrap().shields, 1);

        let msg = s.buy_item(PlayerId(3), ShopItem::VisionCrystal).unwrap();
        assert!(msg.contains("Vision revealed"));
    }

    #[test]
    fn insufficient_coins_rejected_without_mutation() {
        let mut s = shopping_session();
        s.players.get_mut(&PlayerId(1)).unwrap().coins = 5;
        assert!(matches!(
            s.buy_item(PlayerId(1), ShopItem::Shield),
            Err(EngineError::InvalidOperation(_))
        ));
        assert_eq!(s.player(PlayerId(1)).unwrap().coins, 5);
        assert_eq!(s.player(PlayerId(1)).unwrap().shields, 0);
    }

    #[test]
    fn weapons_accumulate_charges() {
        let mut s = shopping_session();
        s.buy_item(PlayerId(1), ShopItem::Weapon(Weapon::BlessedDagger))
            .unwrap();
        assert_eq!(
            s.player(PlayerId(1)).unwrap().weapon_charges(Weapon::BlessedDagger),
            5
        );
        let p = s.players.get_mut(&PlayerId(1)).unwrap();
        p.coins = 60;
        s.buy_item(PlayerId(1), ShopItem::Weapon(Weapon::BlessedDagger))
            .unwrap();
        assert_eq!(
            s.player(PlayerId(1)).unwrap().weapon_charges(Weapon::BlessedDagger),
            10
        );
    }

    #[test]
    fn black_market_needs_the_event() {
        let mut s = shopping_session();
        assert!(matches!(
            s.buy_item(PlayerId(1), ShopItem::SabotageKit),
            Err(EngineError::InvalidOperation(_))
        ));
        s.active_event = Some(EnvironmentEvent::BlackMarket);
        let before = s.ship().hp;
        s.buy_item(PlayerId(1), ShopItem::SabotageKit).unwrap();
        assert!(s.ship().hp < before);
        s.buy_item(PlayerId(2), ShopItem::EmergencyShield).unwrap();
        assert!(s.ship().hp > before - SABOTAGE_KIT_DAMAGE);
    }

    #[test]
    fn one_time_relics_consume_passives_refuse() {
        let mut s = shopping_session();
        {
            let p = s.players.get_mut(&PlayerId(1)).unwrap();
            p.grant_relic(Relic::AncientScroll);
            p.grant_relic(Relic::ShieldOfStars);
        }
        let msg = s.use_relic(PlayerId(1), Relic::AncientScroll).unwrap();
        assert!(msg.contains("20 coins"));
        let p = s.player(PlayerId(1)).unwrap();
        assert_eq!(p.coins, 80);
        assert!(!p.relics.contains(&Relic::AncientScroll));

        assert!(matches!(
            s.use_relic(PlayerId(1), Relic::ShieldOfStars),
            Err(EngineError::InvalidOperation(_))
        ));
        assert!(matches!(
            s.use_relic(PlayerId(1), Relic::AncientScroll),
            Err(EngineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn upgrade_funding_accumulates_and_installs() {
        let mut s = shopping_session();
        let r = s
            .contribute_upgrade(PlayerId(1), Upgrade::AdvancedScanners)
            .unwrap();
        assert_eq!(r.donated, 60);
        assert_eq!(r.total, 60);
        assert!(!r.installed);
        assert_eq!(s.player(PlayerId(1)).unwrap().coins, 0);
        assert!(matches!(
            s.contribute_upgrade(PlayerId(1), Upgrade::AdvancedScanners),
            Err(EngineError::InvalidOperation(_))
        ));

        let r = s
            .contribute_upgrade(PlayerId(2), Upgrade::AdvancedScanners)
            .unwrap();
        assert!(r.installed);
        assert_eq!(r.total, 120);
        assert!(s.ship().has_upgrade(Upgrade::AdvancedScanners));
        assert!(matches!(
            s.contribute_upgrade(PlayerId(3), Upgrade::AdvancedScanners),
            Err(EngineError::InvalidOperation(_))
        ));
        assert_eq!(s.upgrade_funding(Upgrade::AdvancedScanners), 120);
    }
}
