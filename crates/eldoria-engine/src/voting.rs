//! The suspicion vote: plurality elimination with a random tie-break.

use std::collections::{BTreeMap, HashSet};

use eldoria_core::{PlayerId, Role};
use rand::Rng;

use crate::error::{EngineError, EngineResult};
use crate::round::RoundStep;
use crate::session::{Phase, Session};

/// Round-scoped ballot state.
#[derive(Debug, Clone, Default)]
pub(crate) struct VoteState {
    /// Whether a ballot is currently open.
    pub(crate) open: bool,
    /// Tally per living player. A `BTreeMap` keeps iteration stable so the
    /// tie-break draws from a deterministic candidate order.
    pub(crate) tallies: BTreeMap<PlayerId, u32>,
    /// Players who already voted this round.
    pub(crate) voted: HashSet<PlayerId>,
}

/// What the ballot decided.
#[derive(Debug, Clone)]
pub enum VoteOutcome {
    /// The hidden Betrayer was picked: they transform instead of dying.
    Unmasked {
        /// The transformed player.
        player: PlayerId,
        /// Their display name.
        name: String,
    },
    /// An ordinary elimination.
    Eliminated {
        /// The eliminated player.
        player: PlayerId,
        /// Their display name.
        name: String,
        /// The role revealed on elimination.
        role: Option<Role>,
    },
}

impl VoteOutcome {
    /// The public announcement for this outcome.
    pub fn announcement(&self) -> String {
        match self {
            Self::Unmasked { name, .. } => format!(
                "The crew has spoken! {name} is the Betrayer! They transform into the Epic Monster!"
            ),
            Self::Eliminated { name, role, .. } => {
                let role = role.map(|r| r.to_string()).unwrap_or_default();
                format!("The crew has spoken! {name} has been voted out. Their role was: {role}")
            }
        }
    }
}

impl Session {
    /// Open a ballot: zero tallies for every living player, nobody has
    /// voted yet.
    pub(crate) fn start_voting(&mut self) {
        self.votes.tallies = self
            .join_order
            .iter()
            .filter(|id| self.players.get(id).is_some_and(|p| p.alive))
            .map(|id| (*id, 0))
            .collect();
        self.votes.voted.clear();
        self.votes.open = true;
    }

    /// Cast a suspicion vote. One vote per living player per round; targets
    /// must be living players on this round's ballot.
    pub fn cast_vote(&mut self, voter: PlayerId, target: PlayerId) -> EngineResult<()> {
        if self.phase == Phase::Ended {
            return Err(EngineError::AlreadyTerminal);
        }
        if !self.votes.open || self.step != RoundStep::CollectingVotes {
            return Err(EngineError::InvalidOperation("no vote is open".into()));
        }
        let alive = self
            .players
            .get(&voter)
            .ok_or_else(|| EngineError::NotFound(format!("player {voter}")))?
            .alive;
        if !alive {
            return Err(EngineError::InvalidOperation(
                "dead players cannot vote".into(),
            ));
        }
        if self.votes.voted.contains(&voter) {
            return Err(EngineError::InvalidOperation("you already voted".into()));
        }
        let Some(tally) = self.votes.tallies.get_mut(&target) else {
            return Err(EngineError::InvalidOperation(
                "that player is not on the ballot".into(),
            ));
        };
        *tally += 1;
        self.votes.voted.insert(voter);
        Ok(())
    }

    /// True once every living player has voted.
    pub fn voting_complete(&self) -> bool {
        self.votes.open && self.votes.voted.len() >= self.living_players().len()
    }

    /// Current tallies, in stable player order.
    pub fn vote_tallies(&self) -> Vec<(PlayerId, u32)> {
        self.votes.tallies.iter().map(|(id, n)| (*id, *n)).collect()
    }

    /// Close the ballot and apply the result.
    ///
    /// A zero-vote ballot eliminates nobody. Ties at the maximum are broken
    /// uniformly at random among the tied players. The still-hidden
    /// Betrayer transforms instead of dying.
    pub(crate) fn end_voting(&mut self) -> Option<VoteOutcome> {
        self.votes.open = false;
        let max = self.votes.tallies.values().max().copied().unwrap_or(0);
        if max == 0 {
            return None;
        }
        let tied: Vec<PlayerId> = self
            .votes
            .tallies
            .iter()
            .filter(|(_, n)| **n == max)
            .map(|(id, _)| *id)
            .collect();
        let chosen = tied[self.rng.random_range(0..tied.len())];

        if Some(chosen) == self.betrayer_id && !self.monster_revealed {
            let player = self.players.get_mut(&chosen)?;
            player.role = Some(Role::EpicMonster);
            let name = player.name.clone();
            self.monster_revealed = true;
            self.betrayer_caught = true;
            log::info!("session {}: betrayer unmasked by vote", self.key);
            return Some(VoteOutcome::Unmasked {
                player: chosen,
                name,
            });
        }

        let player = self.players.get_mut(&chosen)?;
        player.alive = false;
        let name = player.name.clone();
        let role = player.role;
        self.spectators.insert(chosen);
        Some(VoteOutcome::Eliminated {
            player: chosen,
            name,
            role,
        })
    }
}
