//! A session: one complete game instance tied to a group key.
//!
//! The session owns every piece of mutable game state (players, the ship,
//! the round counter, pending intents, vote tallies) and is the unit of
//! isolation: nothing crosses sessions. All mutation goes through the
//! methods here and in the sibling modules (`round`, `resolve`, `voting`,
//! `economy`); the transport layer only reads snapshots afterward.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use eldoria_core::objective::objective_for;
use eldoria_core::role::role_shape;
use eldoria_core::{
    EnvironmentEvent, GameConfig, Objective, Player, PlayerId, Relic, Role, Ship, Upgrade, Weapon,
};

use crate::action::Intent;
use crate::error::{EngineError, EngineResult};
use crate::round::RoundStep;
use crate::summary::EndingSummary;
use crate::voting::VoteState;
use crate::win::Side;

/// Opaque external identity of a session (e.g. a group chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey(pub i64);

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where the campaign currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Gathering players; the game has not started.
    Lobby,
    /// Rounds 1–3: calm seas, time to prepare.
    Healing,
    /// Rounds 4–9: hazards and hidden sabotage.
    Voyage,
    /// Round 10: the potion appears and the monster is unmasked.
    PotionQuest,
    /// Rounds 11–12: open battle with the monster.
    Showdown,
    /// Round 13: last chance to deliver the potion.
    Delivery,
    /// A suspicion vote is open (sub-phase within a round).
    Voting,
    /// Terminal. No further mutation is accepted.
    Ended,
}

impl Phase {
    /// The main phase for a given 1-based round number.
    pub fn for_round(round: u32) -> Self {
        match round {
            0 => Self::Lobby,
            1..=3 => Self::Healing,
            4..=9 => Self::Voyage,
            10 => Self::PotionQuest,
            11..=12 => Self::Showdown,
            _ => Self::Delivery,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::Healing => write!(f, "Healing Phase"),
            Self::Voyage => write!(f, "Cosmic Voyage"),
            Self::PotionQuest => write!(f, "Potion Quest"),
            Self::Showdown => write!(f, "Monster Showdown"),
            Self::Delivery => write!(f, "Final Delivery"),
            Self::Voting => write!(f, "Voting"),
            Self::Ended => write!(f, "Ended"),
        }
    }
}

/// One game instance. See the module docs for the ownership story.
#[derive(Debug)]
pub struct Session {
    pub(crate) key: SessionKey,
    pub(crate) config: GameConfig,
    pub(crate) players: HashMap<PlayerId, Player>,
    /// Insertion order of `players`: join order, also resolution order.
    pub(crate) join_order: Vec<PlayerId>,
    pub(crate) ship: Ship,
    pub(crate) phase: Phase,
    /// 1-based; 0 while in the lobby.
    pub(crate) current_round: u32,
    pub(crate) step: RoundStep,
    pub(crate) pending: HashMap<PlayerId, Intent>,
    /// Players the open action window is waiting on.
    pub(crate) expected_actors: HashSet<PlayerId>,
    pub(crate) action_deadline: Option<DateTime<Utc>>,
    pub(crate) vote_deadline: Option<DateTime<Utc>>,
    pub(crate) votes: VoteState,
    /// The first-assigned Betrayer; fixed for the whole game.
    pub(crate) betrayer_id: Option<PlayerId>,
    /// The player who becomes the Epic Monster (same as `betrayer_id`).
    pub(crate) monster_id: Option<PlayerId>,
    pub(crate) captain_id: Option<PlayerId>,
    pub(crate) monster_revealed: bool,
    pub(crate) betrayer_caught: bool,
    pub(crate) potion_delivered: bool,
    /// The Devil Hunter's once-per-game empowerment, permanent once armed.
    pub(crate) devil_boost_armed: bool,
    /// The monster's boost-allies declaration; cleared every round.
    pub(crate) villain_boost_active: bool,
    /// A Dragon Rider declared protection; cleared every round.
    pub(crate) dragon_protect_active: bool,
    /// An Angel Guardian is guarding the potion bearer; cleared every round.
    pub(crate) potion_guarded: bool,
    pub(crate) spectators: HashSet<PlayerId>,
    pub(crate) active_event: Option<EnvironmentEvent>,
    pub(crate) upgrade_pool: BTreeMap<Upgrade, u32>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) summary: Option<EndingSummary>,
    pub(crate) rng: StdRng,
}

impl Session {
    /// Create an empty session in the lobby phase.
    pub fn new(key: SessionKey, config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            key,
            config,
            players: HashMap::new(),
            join_order: Vec::new(),
            ship: Ship::default(),
            phase: Phase::Lobby,
            current_round: 0,
            step: RoundStep::Idle,
            pending: HashMap::new(),
            expected_actors: HashSet::new(),
            action_deadline: None,
            vote_deadline: None,
            votes: VoteState::default(),
            betrayer_id: None,
            monster_id: None,
            captain_id: None,
            monster_revealed: false,
            betrayer_caught: false,
            potion_delivered: false,
            devil_boost_armed: false,
            villain_boost_active: false,
            dragon_protect_active: false,
            potion_guarded: false,
            spectators: HashSet::new(),
            active_event: None,
            upgrade_pool: BTreeMap::new(),
            started_at: None,
            summary: None,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Add a player to the lobby.
    pub fn join(&mut self, id: PlayerId, name: impl Into<String>) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.phase != Phase::Lobby {
            return Err(EngineError::CapacityExceeded(
                "the voyage has already departed".into(),
            ));
        }
        if self.players.len() >= self.config.max_players {
            return Err(EngineError::CapacityExceeded("the lobby is full".into()));
        }
        if self.players.contains_key(&id) {
            return Err(EngineError::InvalidOperation("already joined".into()));
        }
        self.players.insert(id, Player::new(id, name));
        self.join_order.push(id);
        Ok(())
    }

    /// Remove a player from the lobby. Only legal before the game starts.
    pub fn leave(&mut self, id: PlayerId) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.phase != Phase::Lobby {
            return Err(EngineError::InvalidOperation(
                "cannot leave a voyage in progress".into(),
            ));
        }
        if self.players.remove(&id).is_none() {
            return Err(EngineError::NotFound(format!("player {id}")));
        }
        self.join_order.retain(|p| *p != id);
        Ok(())
    }

    /// Start the game: size the ship, assign roles and objectives, and
    /// enter round 1.
    pub fn start(&mut self, now: DateTime<Utc>) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.phase != Phase::Lobby {
            return Err(EngineError::InvalidOperation("already started".into()));
        }
        let count = self.players.len();
        if count < self.config.min_players {
            return Err(EngineError::InvalidOperation(format!(
                "need at least {} players",
                self.config.min_players
            )));
        }
        self.ship = Ship::for_crew(count);
        self.assign_roles();
        self.phase = Phase::Healing;
        self.current_round = 1;
        self.started_at = Some(now);
        log::info!(
            "session {}: voyage started with {count} players, ship {}/{}",
            self.key,
            self.ship.hp,
            self.ship.max_hp
        );
        Ok(())
    }

    /// Shuffle the role shape for the current player count onto a shuffled
    /// player order, then hand out secret objectives.
    fn assign_roles(&mut self) {
        let mut order = self.join_order.clone();
        order.shuffle(&mut self.rng);
        let mut shape = role_shape(order.len());
        shape.shuffle(&mut self.rng);

        for (id, role) in order.iter().zip(shape) {
            let rally_charges = self.config.rally_charges;
            let Some(player) = self.players.get_mut(id) else {
                continue;
            };
            player.role = Some(role);
            player.objective = Some(Objective::new(objective_for(role)));
            match role {
                Role::Betrayer => {
                    if self.betrayer_id.is_none() {
                        self.betrayer_id = Some(*id);
                        self.monster_id = Some(*id);
                    }
                }
                Role::Captain => {
                    player.rally_charges = rally_charges;
                    self.captain_id = Some(*id);
                }
                _ => {}
            }
        }
    }

    /// End the session now, regardless of progress. Idempotent: ending an
    /// already-ended session returns the stored summary unchanged.
    pub fn end(&mut self, now: DateTime<Utc>) -> EndingSummary {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }
        let winner = crate::win::evaluate(self).unwrap_or(Side::Dark);
        let summary = EndingSummary::build(self, winner, now);
        self.phase = Phase::Ended;
        self.step = RoundStep::Idle;
        self.summary = Some(summary.clone());
        log::info!("session {}: ended, winner {winner}", self.key);
        summary
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The session's key.
    pub fn key(&self) -> SessionKey {
        self.key
    }

    /// The session's configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Current 1-based round number; 0 in the lobby.
    pub fn round(&self) -> u32 {
        self.current_round
    }

    /// Whether the session reached its terminal state.
    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// The ending summary, once the session is over.
    pub fn summary(&self) -> Option<&EndingSummary> {
        self.summary.as_ref()
    }

    /// The shared ship.
    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    /// A player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// All players in join order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.join_order.iter().filter_map(|id| self.players.get(id))
    }

    /// Living players in join order.
    pub fn living_players(&self) -> Vec<&Player> {
        self.players().filter(|p| p.alive).collect()
    }

    /// Ids of eliminated players who still receive major-event broadcasts.
    pub fn spectators(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.spectators.iter().copied()
    }

    /// The environmental event affecting the current round, if any.
    pub fn active_event(&self) -> Option<EnvironmentEvent> {
        self.active_event
    }

    /// Coins accumulated toward an upgrade so far.
    pub fn upgrade_funding(&self, upgrade: Upgrade) -> u32 {
        self.upgrade_pool.get(&upgrade).copied().unwrap_or(0)
    }

    /// A render-ready snapshot of one player's private state.
    pub fn player_snapshot(&self, id: PlayerId) -> Option<PlayerSnapshot> {
        let p = self.players.get(&id)?;
        Some(PlayerSnapshot {
            id: p.id,
            name: p.name.clone(),
            role: p.role,
            hp: p.hp,
            alive: p.alive,
            coins: p.coins,
            shields: p.shields,
            relics: p.relics.clone(),
            weapons: p.weapons.iter().map(|(w, n)| (*w, *n)).collect(),
            has_potion: p.has_potion,
            collateral_damage: p.collateral_damage,
            objective: p.objective.as_ref().map(|o| ObjectiveView {
                description: o.spec.description(),
                progress: o.progress,
                target: o.spec.target,
                completed: o.completed,
            }),
        })
    }

    // -----------------------------------------------------------------------
    // Action window
    // -----------------------------------------------------------------------

    /// Record a player's intent for the current round.
    ///
    /// Rejected, without mutation, when no window is open, the player is
    /// dead, blocked, unknown, or the action is illegal for their role or
    /// resources. Resubmission before the window closes replaces the
    /// earlier intent.
    pub fn submit_action(
        &mut self,
        player_id: PlayerId,
        kind: crate::action::ActionKind,
        target: Option<PlayerId>,
        weapon: Option<Weapon>,
    ) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if self.step != RoundStep::CollectingActions {
            return Err(EngineError::InvalidOperation(
                "no action window is open".into(),
            ));
        }
        let player = self
            .players
            .get(&player_id)
            .ok_or_else(|| EngineError::NotFound(format!("player {player_id}")))?;
        if !player.alive {
            return Err(EngineError::InvalidOperation(
                "dead players cannot act".into(),
            ));
        }
        if !self.expected_actors.contains(&player_id) {
            return Err(EngineError::InvalidOperation(
                "your action was blocked this round".into(),
            ));
        }
        crate::action::ensure_legal(self, player, kind, weapon)?;
        self.pending.insert(
            player_id,
            Intent {
                kind,
                target,
                weapon,
            },
        );
        Ok(())
    }

    /// True once every expected actor has submitted an intent.
    pub fn action_window_complete(&self) -> bool {
        self.step == RoundStep::CollectingActions
            && self
                .expected_actors
                .iter()
                .all(|id| self.pending.contains_key(id))
    }

    /// True once the action window's deadline has passed.
    pub fn action_window_expired(&self, now: DateTime<Utc>) -> bool {
        self.step == RoundStep::CollectingActions
            && self.action_deadline.is_some_and(|d| now >= d)
    }

    // -----------------------------------------------------------------------
    // Shared internals
    // -----------------------------------------------------------------------

    /// Captain's flat mitigation on ship-directed and collateral damage,
    /// applied only while a Captain lives.
    pub(crate) fn captain_mitigated(&self, amount: u32) -> u32 {
        let captain_alive = self
            .captain_id
            .and_then(|id| self.players.get(&id))
            .is_some_and(|p| p.alive && p.role == Some(Role::Captain));
        if captain_alive { amount * 9 / 10 } else { amount }
    }

    /// Living players carrying a given relic.
    pub(crate) fn living_holders(&self, relic: Relic) -> Vec<PlayerId> {
        self.join_order
            .iter()
            .copied()
            .filter(|id| {
                self.players
                    .get(id)
                    .is_some_and(|p| p.alive && p.relics.contains(&relic))
            })
            .collect()
    }
}

/// Render-ready snapshot of a player's private state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identity.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Assigned role, if the game has started.
    pub role: Option<Role>,
    /// Current hit points.
    pub hp: u32,
    /// Alive flag.
    pub alive: bool,
    /// Coin balance.
    pub coins: u32,
    /// Shield charges.
    pub shields: u32,
    /// Relics held.
    pub relics: Vec<Relic>,
    /// Premium weapons and their remaining charges.
    pub weapons: Vec<(Weapon, u32)>,
    /// Carrying the potion.
    pub has_potion: bool,
    /// Outstanding collateral damage.
    pub collateral_damage: u32,
    /// Objective state, if assigned.
    pub objective: Option<ObjectiveView>,
}

/// Objective progress as shown to its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveView {
    /// Player-facing description.
    pub description: String,
    /// Current progress counter.
    pub progress: u32,
    /// Completion threshold.
    pub target: u32,
    /// Whether the reward has been granted.
    pub completed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(n: usize) -> Session {
        let mut s = Session::new(SessionKey(-100), GameConfig::default().with_seed(7));
        for i in 0..n {
            s.join(PlayerId(i as u64 + 1), format!("Player {}", i + 1))
                .unwrap();
        }
        s
    }

    #[test]
    fn phase_table() {
        assert_eq!(Phase::for_round(0), Phase::Lobby);
        assert_eq!(Phase::for_round(1), Phase::Healing);
        assert_eq!(Phase::for_round(3), Phase::Healing);
        assert_eq!(Phase::for_round(4), Phase::Voyage);
        assert_eq!(Phase::for_round(9), Phase::Voyage);
        assert_eq!(Phase::for_round(10), Phase::PotionQuest);
        assert_eq!(Phase::for_round(11), Phase::Showdown);
        assert_eq!(Phase::for_round(12), Phase::Showdown);
        assert_eq!(Phase::for_round(13), Phase::Delivery);
    }

    #[test]
    fn join_rules() {
        let mut s = session_with(0);
        s.join(PlayerId(1), "Ada").unwrap();
        assert!(matches!(
            s.join(PlayerId(1), "Ada again"),
            Err(EngineError::InvalidOperation(_))
        ));
        for i in 2..=21 {
            s.join(PlayerId(i), format!("P{i}")).unwrap();
        }
        assert!(matches!(
            s.join(PlayerId(99), "Late"),
            Err(EngineError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn join_after_start_rejected() {
        let mut s = session_with(4);
        s.start(Utc::now()).unwrap();
        assert!(matches!(
            s.join(PlayerId(99), "Late"),
            Err(EngineError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn leave_only_in_lobby() {
        let mut s = session_with(5);
        s.leave(PlayerId(5)).unwrap();
        assert_eq!(s.players().count(), 4);
        assert!(matches!(
            s.leave(PlayerId(99)),
            Err(EngineError::NotFound(_))
        ));
        s.start(Utc::now()).unwrap();
        assert!(matches!(
            s.leave(PlayerId(1)),
            Err(EngineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn start_needs_minimum() {
        let mut s = session_with(3);
        assert!(matches!(
            s.start(Utc::now()),
            Err(EngineError::InvalidOperation(_))
        ));
        s.join(PlayerId(10), "Fourth").unwrap();
        s.start(Utc::now()).unwrap();
        assert_eq!(s.phase(), Phase::Healing);
        assert_eq!(s.round(), 1);
    }

    #[test]
    fn start_scales_and_damages_ship() {
        let mut s = session_with(4);
        s.start(Utc::now()).unwrap();
        assert_eq!(s.ship().max_hp, 80);
        assert_eq!(s.ship().hp, 56);
    }

    #[test]
    fn roles_assigned_with_betrayer_and_captain() {
        let mut s = session_with(6);
        s.start(Utc::now()).unwrap();
        assert!(s.players().all(|p| p.role.is_some()));
        assert!(s.betrayer_id.is_some());
        assert_eq!(s.betrayer_id, s.monster_id);
        let captain = s.players().find(|p| p.role == Some(Role::Captain)).unwrap();
        assert_eq!(captain.rally_charges, 2);
        assert_eq!(s.captain_id, Some(captain.id));
        assert!(s.players().all(|p| p.objective.is_some()));
    }

    #[test]
    fn end_is_idempotent() {
        let mut s = session_with(4);
        s.start(Utc::now()).unwrap();
        let now = Utc::now();
        let first = s.end(now);
        assert!(s.is_ended());
        let second = s.end(now + chrono::Duration::seconds(60));
        assert_eq!(first.duration_secs, second.duration_secs);
        assert!(matches!(
            s.join(PlayerId(50), "Ghost"),
            Err(EngineError::AlreadyTerminal)
        ));
    }

    #[test]
    fn snapshot_reflects_player() {
        let mut s = session_with(4);
        s.start(Utc::now()).unwrap();
        let snap = s.player_snapshot(PlayerId(1)).unwrap();
        assert_eq!(snap.hp, 100);
        assert!(snap.alive);
        assert!(snap.objective.is_some());
        assert!(s.player_snapshot(PlayerId(99)).is_none());
    }
}
