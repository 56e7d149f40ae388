//! Win-condition evaluation: a pure function of session state.

use serde::{Deserialize, Serialize};

use crate::session::Session;

/// The winning side of a finished voyage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// The crew delivered the potion (or wiped out the villains).
    Light,
    /// The saboteurs sank the voyage.
    Dark,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

/// Evaluate the win conditions, first match wins:
///
/// 1. Ship destroyed, or no living light player → dark.
/// 2. No living dark player, from round 5 on → light. The round floor keeps
///    an early lucky elimination from ending the game before the villain
///    economy has mattered.
/// 3. Potion delivered → light.
/// 4. Out of rounds without delivery → dark.
/// 5. Otherwise the game continues.
///
/// Never fires before round 1 (the lobby has no winner).
pub fn evaluate(session: &Session) -> Option<Side> {
    if session.current_round < 1 {
        return None;
    }

    let living = session.living_players();
    let light_alive = living.iter().any(|p| !p.is_dark());
    let dark_alive = living.iter().any(|p| p.is_dark());

    if session.ship.hp == 0 || !light_alive {
        return Some(Side::Dark);
    }
    if !dark_alive && session.current_round >= 5 {
        return Some(Side::Light);
    }
    if session.potion_delivered {
        return Some(Side::Light);
    }
    if session.current_round > session.config.total_rounds {
        return Some(Side::Dark);
    }
    None
}
