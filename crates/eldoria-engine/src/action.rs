//! Per-round player intents and their legality rules.

use eldoria_core::{PlayerId, Player, Role, Weapon};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::session::Session;

/// What a player wants to do this round.
///
/// One intent per player per round; resubmitting replaces the previous
/// intent until the window closes. Missing optional fields (target, weapon)
/// degrade to the weakest interpretation at resolution time rather than
/// failing the round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Do nothing. The default for players who never submit.
    #[default]
    Skip,
    /// Throw the free basic strike at a target.
    BasicAttack,
    /// Spend a premium weapon charge on a target.
    WeaponAttack,
    /// Heal: targeted for the Healer, self-heal for everyone else.
    Heal,
    /// Repair the ship (Captain or Healer).
    Repair,
    /// Spend a rally charge to heal the whole crew (Captain).
    Rally,
    /// Search for a relic (Explorer).
    SearchRelic,
    /// Shield the crew from monster collateral this round (Dragon Rider).
    Protect,
    /// Guard the potion bearer this round (Angel Guardian).
    ProtectPotion,
    /// Forecast the round's dangers (Oracle).
    Predict,
    /// Brace to dodge incoming damage this round (Crew Member).
    Dodge,
    /// Deliver the potion and win the voyage (potion bearer, late game).
    Deliver,
    /// Damage the ship anonymously (Betrayer, Devil Hunter).
    Sabotage,
    /// Block a target's next action (Shadow Saboteur).
    Block,
    /// Stage minor ship damage to cast suspicion (Betrayer, limited uses).
    FrameJob,
    /// Plant an anonymous tip on a target (Betrayer, limited uses).
    FalseIntel,
    /// Permanently empower the monster (Devil Hunter, once per game).
    BoostMonster,
    /// Empower all villain damage this round (Epic Monster).
    BoostVillains,
    /// Explicitly press the attack (Epic Monster; the attack also happens
    /// on its own every round once the monster is revealed).
    MonsterAttack,
}

/// A submitted intent: the action plus its optional operands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// The chosen action.
    pub kind: ActionKind,
    /// Target player, where the action takes one.
    pub target: Option<PlayerId>,
    /// Weapon to swing, for [`ActionKind::WeaponAttack`].
    pub weapon: Option<Weapon>,
}

/// Check that `kind` is legal for this player in the session's current
/// state. Missing optional operands are not an error here; illegal roles,
/// spent resources, and out-of-phase requests are.
pub(crate) fn ensure_legal(
    session: &Session,
    player: &Player,
    kind: ActionKind,
    weapon: Option<Weapon>,
) -> EngineResult<()> {
    let role = player
        .role
        .ok_or_else(|| EngineError::InvalidOperation("no role assigned".into()))?;
    let round = session.current_round;

    let allowed = match kind {
        ActionKind::Skip | ActionKind::Heal => true,
        ActionKind::BasicAttack => !role.is_dark(),
        ActionKind::WeaponAttack => {
            !role.is_dark()
                && match weapon {
                    Some(w) => player.weapon_charges(w) > 0,
                    // Absent weapon degrades to a skip at resolution.
                    None => true,
                }
        }
        ActionKind::Repair => matches!(role, Role::Captain | Role::Healer),
        ActionKind::Rally => role == Role::Captain && player.rally_charges > 0,
        ActionKind::SearchRelic => role == Role::Explorer,
        ActionKind::Protect => role == Role::DragonRider,
        ActionKind::ProtectPotion => role == Role::AngelGuardian,
        ActionKind::Predict => role == Role::Oracle,
        ActionKind::Dodge => role == Role::CrewMember,
        ActionKind::Deliver => player.has_potion && round >= session.config.potion_round,
        ActionKind::Sabotage => {
            role == Role::Betrayer || (role == Role::DevilHunter && round >= 2)
        }
        ActionKind::Block => role == Role::ShadowSaboteur && round >= 2,
        ActionKind::FrameJob => role == Role::Betrayer && player.frame_job_uses > 0,
        ActionKind::FalseIntel => role == Role::Betrayer && player.false_intel_uses > 0,
        ActionKind::BoostMonster => {
            role == Role::DevilHunter && !session.devil_boost_armed && round >= 2
        }
        ActionKind::BoostVillains | ActionKind::MonsterAttack => {
            role == Role::EpicMonster && round >= 2
        }
    };

    if allowed {
        Ok(())
    } else {
        Err(EngineError::InvalidOperation(format!(
            "{kind:?} is not available to you right now"
        )))
    }
}
