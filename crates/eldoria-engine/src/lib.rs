//! Game engine for Eldoria: a multi-session, turn-based social-deduction
//! voyage for 4–21 players over a fixed 13-round campaign.
//!
//! The engine is a plain library: it never performs network I/O, never
//! sleeps, and never installs a logger. A transport layer (chat bot, test
//! harness) creates sessions through the [`SessionRegistry`], forwards
//! player intents with [`Session::submit_action`] and
//! [`Session::cast_vote`], drives each round with
//! [`SessionRegistry::advance`] as directed by the returned [`Directive`],
//! and renders the event log and snapshots it gets back.

pub mod action;
pub mod economy;
pub mod error;
pub mod registry;
mod resolve;
pub mod round;
pub mod session;
pub mod summary;
pub mod voting;
pub mod win;

pub use action::{ActionKind, Intent};
pub use economy::UpgradeReceipt;
pub use error::{EngineError, EngineResult};
pub use registry::{SessionHandle, SessionRegistry};
pub use round::{Advance, Directive, Notice, RoundStep};
pub use session::{ObjectiveView, Phase, PlayerSnapshot, Session, SessionKey};
pub use summary::{EndingSummary, PlayerOutcome};
pub use voting::VoteOutcome;
pub use win::{Side, evaluate};
