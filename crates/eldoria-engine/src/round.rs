//! The per-round state machine.
//!
//! An external scheduler drives each round by calling
//! [`Session::advance_round`] repeatedly. The engine never sleeps: each call
//! runs as far as it can, then hands back a [`Directive`] telling the host
//! what to wait for (an action window, a voting window, the next round, or
//! nothing: the game is over). The two collection windows are bounded
//! waits, not barriers: when the host observes the deadline passing it
//! simply calls `advance_round` again and stragglers default to a skip.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use eldoria_core::{EnvironmentEvent, PlayerId, Role, RoundState};

use crate::error::{EngineError, EngineResult};
use crate::session::{Phase, Session};
use crate::summary::EndingSummary;
use crate::win::{self, Side};

/// Where the round-advance flow stands between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStep {
    /// Between rounds; the next call opens a round.
    Idle,
    /// An action window is open.
    CollectingActions,
    /// A voting window is open.
    CollectingVotes,
}

/// What the host should do after an `advance_round` call.
#[derive(Debug, Clone)]
pub enum Directive {
    /// The session had already ended; nothing happened.
    AlreadyEnded,
    /// Collect player intents until the deadline or until
    /// [`Session::action_window_complete`] reports true, then advance again.
    AwaitActions {
        /// When the window closes.
        deadline: DateTime<Utc>,
    },
    /// Collect votes until the deadline or until
    /// [`Session::voting_complete`] reports true, then advance again.
    AwaitVotes {
        /// When the window closes.
        deadline: DateTime<Utc>,
    },
    /// The round finished; schedule the next `advance_round` call.
    NextRound {
        /// The upcoming round number.
        round: u32,
    },
    /// The game is over; the session should be evicted from its registry.
    Ended(EndingSummary),
}

/// A private message for one player, produced during a round.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Recipient.
    pub to: PlayerId,
    /// Message text.
    pub text: String,
}

/// The outcome of one `advance_round` call: what happened, whom to tell,
/// and what to do next.
#[derive(Debug, Clone)]
pub struct Advance {
    /// Ordered public event log for the group.
    pub events: Vec<String>,
    /// Private messages for individual players.
    pub notices: Vec<Notice>,
    /// What the host should wait for next.
    pub directive: Directive,
}

impl Session {
    /// Drive the round state machine one step.
    ///
    /// Idempotent against an ended session: the call reports
    /// [`Directive::AlreadyEnded`] and mutates nothing. Calling it on a
    /// lobby is a host error and is rejected.
    pub fn advance_round(&mut self, now: DateTime<Utc>) -> EngineResult<Advance> {
        if self.phase == Phase::Ended {
            return Ok(Advance {
                events: Vec::new(),
                notices: Vec::new(),
                directive: Directive::AlreadyEnded,
            });
        }
        if self.phase == Phase::Lobby {
            return Err(EngineError::InvalidOperation(
                "the game has not started".into(),
            ));
        }
        match self.step {
            RoundStep::Idle => self.open_round(now),
            RoundStep::CollectingActions => self.close_actions(now),
            RoundStep::CollectingVotes => self.close_votes(now),
        }
    }

    /// Steps 1–6 of the round algorithm: attrition, win check, phase
    /// resolution, divine intervention, scripted events, and opening the
    /// action-collection window.
    fn open_round(&mut self, now: DateTime<Utc>) -> EngineResult<Advance> {
        let mut events = Vec::new();
        let mut notices = Vec::new();
        log::info!("session {}: round {} opens", self.key, self.current_round);

        self.apply_attrition(&mut events);

        if let Some(side) = win::evaluate(self) {
            return Ok(self.finish(side, now, events, notices));
        }

        self.phase = Phase::for_round(self.current_round);

        if self.current_round > 3
            && self
                .rng
                .random_bool(self.config.divine_intervention_chance)
        {
            let amount = self.config.divine_heal_amount;
            for p in self.players.values_mut() {
                if p.alive && !p.is_dark() {
                    p.heal(amount);
                }
            }
            events.push(format!(
                "Divine intervention! All heroes healed +{amount} HP."
            ));
        }

        if self.current_round == self.config.potion_round {
            self.potion_round_events(&mut events, &mut notices);
        }

        self.open_action_window(&mut notices);
        let deadline = now + Duration::seconds(self.config.action_window_secs);
        self.action_deadline = Some(deadline);
        self.step = RoundStep::CollectingActions;

        Ok(Advance {
            events,
            notices,
            directive: Directive::AwaitActions { deadline },
        })
    }

    /// Kill anyone whose collateral wound has gone unhealed too long.
    fn apply_attrition(&mut self, events: &mut Vec<String>) {
        let window = self.config.collateral_rounds;
        let round = self.current_round;
        let order = self.join_order.clone();
        for id in order {
            let Some(p) = self.players.get_mut(&id) else {
                continue;
            };
            if p.alive
                && p.collateral_damage > 0
                && round.saturating_sub(p.collateral_round) >= window
            {
                p.alive = false;
                events.push(format!(
                    "{} succumbed to untreated collateral damage!",
                    p.name
                ));
                self.spectators.insert(id);
            }
        }
    }

    /// The scripted potion round: a bearer is chosen among the living light
    /// players, and the hidden Betrayer, if still alive, is unmasked.
    fn potion_round_events(&mut self, events: &mut Vec<String>, notices: &mut Vec<Notice>) {
        let candidates: Vec<PlayerId> = self
            .join_order
            .iter()
            .copied()
            .filter(|id| {
                self.players
                    .get(id)
                    .is_some_and(|p| p.alive && !p.is_dark())
            })
            .collect();
        if !candidates.is_empty() {
            let chosen = candidates[self.rng.random_range(0..candidates.len())];
            if let Some(p) = self.players.get_mut(&chosen) {
                p.has_potion = true;
                events.push(format!(
                    "The Cosmic Potion has been found! {} carries it now.",
                    p.name
                ));
                notices.push(Notice {
                    to: chosen,
                    text: "You carry the Cosmic Potion. Deliver it before the voyage ends!".into(),
                });
            }
        }

        if let Some(bid) = self.betrayer_id
            && !self.monster_revealed
            && let Some(betrayer) = self.players.get_mut(&bid)
            && betrayer.alive
        {
            betrayer.role = Some(Role::EpicMonster);
            self.monster_revealed = true;
            events.push("The monster reveals itself! The final battle begins.".into());
        }
    }

    /// Clear the previous round's intents, consume action blocks, and
    /// compute the set of players the window waits on.
    fn open_action_window(&mut self, notices: &mut Vec<Notice>) {
        self.pending.clear();
        self.expected_actors.clear();
        let order = self.join_order.clone();
        for id in order {
            let Some(p) = self.players.get_mut(&id) else {
                continue;
            };
            p.round = RoundState::default();
            if !p.alive {
                continue;
            }
            if p.action_blocked {
                p.action_blocked = false;
                notices.push(Notice {
                    to: id,
                    text: "The Shadow Saboteur prevented you from acting today.".into(),
                });
            } else {
                self.expected_actors.insert(id);
            }
        }
    }

    /// Steps 7–8: resolve collected actions, then either open the voting
    /// window or conclude the round.
    fn close_actions(&mut self, now: DateTime<Utc>) -> EngineResult<Advance> {
        let (mut events, notices) = self.resolve_actions();

        if self.current_round >= 4 && !self.betrayer_caught {
            self.start_voting();
            self.phase = Phase::Voting;
            let deadline = now + Duration::seconds(self.config.voting_window_secs);
            self.vote_deadline = Some(deadline);
            self.step = RoundStep::CollectingVotes;
            events.push("Voting has begun! Who do you suspect?".into());
            return Ok(Advance {
                events,
                notices,
                directive: Directive::AwaitVotes { deadline },
            });
        }

        self.conclude_round(now, events, notices)
    }

    /// Resolve the ballot, restore the main phase, and conclude the round.
    fn close_votes(&mut self, now: DateTime<Utc>) -> EngineResult<Advance> {
        let mut events = Vec::new();
        let notices = Vec::new();
        match self.end_voting() {
            Some(outcome) => events.push(outcome.announcement()),
            None => events.push("The crew could not decide. Nobody was cast out.".into()),
        }
        self.phase = Phase::for_round(self.current_round);
        self.conclude_round(now, events, notices)
    }

    /// Steps 9–11: win check, round advance, and post-round effects.
    fn conclude_round(
        &mut self,
        now: DateTime<Utc>,
        mut events: Vec<String>,
        notices: Vec<Notice>,
    ) -> EngineResult<Advance> {
        if let Some(side) = win::evaluate(self) {
            return Ok(self.finish(side, now, events, notices));
        }

        self.current_round += 1;
        if self.current_round > self.config.total_rounds {
            // Out of days: the potion never arrived.
            let side = win::evaluate(self).unwrap_or(Side::Dark);
            return Ok(self.finish(side, now, events, notices));
        }

        if self.rng.random_bool(self.config.environment_event_chance) {
            let all = EnvironmentEvent::all();
            let event = all[self.rng.random_range(0..all.len())];
            self.active_event = Some(event);
            events.push(format!("Random event: {event}! {}", event.description()));
        }

        let auto = self.ship.auto_repair_amount();
        if auto > 0 {
            self.ship.repair(auto);
            events.push(format!("The auto-repair system restored {auto} hull."));
        }

        self.step = RoundStep::Idle;
        self.action_deadline = None;
        self.vote_deadline = None;
        log::info!(
            "session {}: round concluded, next is {}",
            self.key,
            self.current_round
        );
        Ok(Advance {
            events,
            notices,
            directive: Directive::NextRound {
                round: self.current_round,
            },
        })
    }

    /// Terminate the session with a winner and build the ending summary.
    pub(crate) fn finish(
        &mut self,
        winner: Side,
        now: DateTime<Utc>,
        mut events: Vec<String>,
        notices: Vec<Notice>,
    ) -> Advance {
        let summary = EndingSummary::build(self, winner, now);
        self.phase = Phase::Ended;
        self.step = RoundStep::Idle;
        self.summary = Some(summary.clone());
        events.push(match winner {
            Side::Light => "VICTORY! The light triumphs!".into(),
            Side::Dark => "DEFEAT... darkness reigns.".into(),
        });
        log::info!(
            "session {}: game over after round {}, winner {winner}",
            self.key,
            self.current_round
        );
        Advance {
            events,
            notices,
            directive: Directive::Ended(summary),
        }
    }

    /// True once the voting window's deadline has passed.
    pub fn voting_expired(&self, now: DateTime<Utc>) -> bool {
        self.step == RoundStep::CollectingVotes && self.vote_deadline.is_some_and(|d| now >= d)
    }
}
