//! The structured summary emitted when a session ends.
//!
//! External collaborators (statistics stores, announcement renderers) read
//! this instead of poking at session internals.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use eldoria_core::{PlayerId, Role};

use crate::session::Session;
use crate::win::Side;

/// One player's row in the ending summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerOutcome {
    /// Player identity.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Final role (post-transformation, if any).
    pub role: Option<Role>,
    /// Alive at game end.
    pub alive: bool,
    /// Final coin balance.
    pub coins: u32,
    /// Whether this player's side won.
    pub won: bool,
}

/// Everything a statistics collaborator needs about a finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingSummary {
    /// The winning side.
    pub winner: Side,
    /// Rounds played when the game ended.
    pub rounds_played: u32,
    /// Wall-clock seconds from start to end; 0 if the game never started.
    pub duration_secs: i64,
    /// Percentage of players still alive at the end.
    pub survival_rate: f64,
    /// Final hull points.
    pub ship_hp: u32,
    /// Hull capacity.
    pub ship_max_hp: u32,
    /// The richest player: the MVP by coin total.
    pub mvp: Option<PlayerOutcome>,
    /// Every player's outcome, in join order.
    pub players: Vec<PlayerOutcome>,
}

impl EndingSummary {
    /// Build the summary from a session's final state.
    pub(crate) fn build(session: &Session, winner: Side, now: DateTime<Utc>) -> Self {
        let players: Vec<PlayerOutcome> = session
            .players()
            .map(|p| PlayerOutcome {
                id: p.id,
                name: p.name.clone(),
                role: p.role,
                alive: p.alive,
                coins: p.coins,
                won: match winner {
                    Side::Light => !p.is_dark(),
                    Side::Dark => p.is_dark(),
                },
            })
            .collect();

        let total = players.len();
        let alive = players.iter().filter(|p| p.alive).count();
        let survival_rate = if total == 0 {
            0.0
        } else {
            alive as f64 / total as f64 * 100.0
        };

        let mvp = players.iter().max_by_key(|p| p.coins).cloned();

        let duration_secs = session
            .started_at
            .map(|t| (now - t).num_seconds())
            .unwrap_or(0);

        Self {
            winner,
            rounds_played: session.current_round,
            duration_secs,
            survival_rate,
            ship_hp: session.ship.hp,
            ship_max_hp: session.ship.max_hp,
            mvp,
            players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionKey;
    use eldoria_core::GameConfig;

    #[test]
    fn summary_captures_final_state() {
        let mut s = Session::new(SessionKey(-4), GameConfig::default().with_seed(9));
        for i in 1..=4 {
            s.join(PlayerId(i), format!("Player {i}")).unwrap();
        }
        let started = Utc::now();
        s.start(started).unwrap();
        s.players.get_mut(&PlayerId(2)).unwrap().coins = 80;
        s.players.get_mut(&PlayerId(3)).unwrap().alive = false;

        let now = started + chrono::Duration::seconds(300);
        let summary = EndingSummary::build(&s, Side::Dark, now);

        assert_eq!(summary.winner, Side::Dark);
        assert_eq!(summary.players.len(), 4);
        assert_eq!(summary.duration_secs, 300);
        assert_eq!(summary.survival_rate, 75.0);
        assert_eq!(summary.mvp.as_ref().unwrap().id, PlayerId(2));
        // Winners are exactly the dark-aligned players.
        for p in &summary.players {
            let dark = s.player(p.id).unwrap().is_dark();
            assert_eq!(p.won, dark);
        }
    }

    #[test]
    fn summary_serializes() {
        let mut s = Session::new(SessionKey(-4), GameConfig::default().with_seed(9));
        for i in 1..=4 {
            s.join(PlayerId(i), format!("Player {i}")).unwrap();
        }
        s.start(Utc::now()).unwrap();
        let summary = EndingSummary::build(&s, Side::Light, Utc::now());
        let json = serde_json::to_string(&summary).unwrap();
        let back: EndingSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.winner, Side::Light);
        assert_eq!(back.players.len(), 4);
    }
}
