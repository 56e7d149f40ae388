//! The session registry: one active session per key, shared across threads.
//!
//! The registry owns a mutex-protected map of `SessionKey → Arc<Mutex<Session>>`
//! plus a secondary `PlayerId → SessionKey` index so "which game is this
//! player in" never scans every session. Each session's own mutex is the
//! per-session critical section: exactly one round-advance runs at a time
//! per session, while different sessions proceed in parallel. A key is
//! reusable only after its previous session ended, and a stale handle to a
//! replaced session can be detected with [`SessionRegistry::is_current`]
//! so a delayed callback never mutates the wrong game.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};

use eldoria_core::{GameConfig, PlayerId};

use crate::error::{EngineError, EngineResult};
use crate::round::{Advance, Directive};
use crate::session::{Session, SessionKey};
use crate::summary::EndingSummary;

/// Shared handle to one session. Lock it for any read or mutation.
pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug, Default)]
struct Inner {
    sessions: HashMap<SessionKey, SessionHandle>,
    by_player: HashMap<PlayerId, SessionKey>,
}

/// Owner of all live sessions.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: Mutex<Inner>,
}

impl SessionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Whether no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.lock().sessions.is_empty()
    }

    /// Create a session for a key. Rejected while the key still has a
    /// session that has not ended.
    pub fn create(&self, key: SessionKey, config: GameConfig) -> EngineResult<SessionHandle> {
        let mut inner = self.lock();
        if let Some(existing) = inner.sessions.get(&key) {
            let ended = lock_session(existing).is_ended();
            if !ended {
                return Err(EngineError::InvalidOperation(format!(
                    "a game is already running for key {key}"
                )));
            }
        }
        let handle: SessionHandle = Arc::new(Mutex::new(Session::new(key, config)));
        inner.sessions.insert(key, Arc::clone(&handle));
        log::info!("registry: created session for key {key}");
        Ok(handle)
    }

    /// The live session for a key, if any.
    pub fn get(&self, key: SessionKey) -> Option<SessionHandle> {
        self.lock().sessions.get(&key).cloned()
    }

    /// The session a player has joined, via the secondary index.
    pub fn find_by_player(&self, player: PlayerId) -> Option<SessionHandle> {
        let inner = self.lock();
        let key = inner.by_player.get(&player)?;
        inner.sessions.get(key).cloned()
    }

    /// Join a player into a key's session, keeping the player index
    /// consistent. A player can be in at most one session at a time.
    pub fn join(
        &self,
        key: SessionKey,
        player: PlayerId,
        name: impl Into<String>,
    ) -> EngineResult<()> {
        let mut inner = self.lock();
        if inner.by_player.contains_key(&player) {
            return Err(EngineError::InvalidOperation(
                "already in another game".into(),
            ));
        }
        let handle = inner
            .sessions
            .get(&key)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("session {key}")))?;
        lock_session(&handle).join(player, name)?;
        inner.by_player.insert(player, key);
        Ok(())
    }

    /// Remove a player from a key's lobby and from the index.
    pub fn leave(&self, key: SessionKey, player: PlayerId) -> EngineResult<()> {
        let mut inner = self.lock();
        let handle = inner
            .sessions
            .get(&key)
            .cloned()
            .ok_or_else(|| EngineError::NotFound(format!("session {key}")))?;
        lock_session(&handle).leave(player)?;
        inner.by_player.remove(&player);
        Ok(())
    }

    /// Drive a session's round state machine one step, evicting the session
    /// once it reports its ending. This is the entry point a scheduler
    /// should use: a callback that fires after its session was replaced or
    /// ended finds nothing to mutate.
    pub fn advance(&self, key: SessionKey, now: DateTime<Utc>) -> EngineResult<Advance> {
        let handle = self
            .get(key)
            .ok_or_else(|| EngineError::NotFound(format!("session {key}")))?;
        let advance = lock_session(&handle).advance_round(now)?;
        if matches!(
            advance.directive,
            Directive::Ended(_) | Directive::AlreadyEnded
        ) {
            self.evict(key, &handle);
        }
        Ok(advance)
    }

    /// End a session now (explicit admin action) and evict it. Idempotent:
    /// a key with no live session returns `None`.
    pub fn end(&self, key: SessionKey, now: DateTime<Utc>) -> Option<EndingSummary> {
        let handle = self.get(key)?;
        let summary = lock_session(&handle).end(now);
        self.evict(key, &handle);
        Some(summary)
    }

    /// Whether a handle is still the registry's current session for a key.
    /// Delayed callbacks check this before acting on a cached handle.
    pub fn is_current(&self, key: SessionKey, handle: &SessionHandle) -> bool {
        self.lock()
            .sessions
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, handle))
    }

    /// Remove a session and its players' index entries, but only while the
    /// given handle is still the current one for the key.
    fn evict(&self, key: SessionKey, handle: &SessionHandle) {
        let mut inner = self.lock();
        let current = inner
            .sessions
            .get(&key)
            .is_some_and(|c| Arc::ptr_eq(c, handle));
        if !current {
            return;
        }
        inner.sessions.remove(&key);
        inner.by_player.retain(|_, k| *k != key);
        log::info!("registry: evicted session for key {key}");
    }
}

/// Lock a session, tolerating a poisoned mutex: the game state itself is
/// kept consistent by the engine's no-partial-mutation error discipline.
fn lock_session(handle: &SessionHandle) -> std::sync::MutexGuard<'_, Session> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}
