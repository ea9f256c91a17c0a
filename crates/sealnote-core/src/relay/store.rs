use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tokio::time::Instant;

use super::session::Session;
use super::{
    validate_assertion, validate_challenge, validate_session_id, DEFAULT_MAX_SESSIONS,
    SESSION_TTL,
};
use crate::error::{Result, SealnoteError};

/// Concurrent, TTL-bounded session map.
///
/// Every operation, including the sweeper, runs under the same mutex, so
/// `store_assertion` is an atomic check-and-set and readers never see a
/// partially written session.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions,
        }
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    fn lock_sessions(&self) -> Result<MutexGuard<'_, HashMap<String, Session>>> {
        self.sessions
            .lock()
            .map_err(|_| SealnoteError::Storage("Session store poisoned".to_string()))
    }

    /// Open a session for `id` with `challenge`.
    ///
    /// # Errors
    ///
    /// - `Validation` for a malformed id or challenge
    /// - `Conflict` if a live session already uses `id`
    /// - `Capacity` if the live session count is at the maximum
    pub fn create(&self, id: &str, challenge: &str) -> Result<Session> {
        validate_session_id(id)?;
        validate_challenge(challenge)?;

        let now = Instant::now();
        let mut sessions = self.lock_sessions()?;

        if let Some(existing) = sessions.get(id) {
            if !existing.is_expired_at(now) {
                return Err(SealnoteError::Conflict(format!(
                    "session {} already exists",
                    id
                )));
            }
            sessions.remove(id);
        }

        if sessions.len() >= self.max_sessions {
            sessions.retain(|_, session| !session.is_expired_at(now));
            if sessions.len() >= self.max_sessions {
                tracing::warn!(max = self.max_sessions, "session store at capacity");
                return Err(SealnoteError::Capacity(format!(
                    "at most {} sessions may be open",
                    self.max_sessions
                )));
            }
        }

        let created_at = Utc::now().timestamp_millis();
        let session = Session {
            id: id.to_string(),
            challenge: challenge.to_string(),
            assertion: None,
            created_at,
            expires_at: created_at + SESSION_TTL.as_millis() as i64,
            deadline: now + SESSION_TTL,
        };
        sessions.insert(id.to_string(), session.clone());
        tracing::debug!(session_id = %id, "session created");
        Ok(session)
    }

    /// Snapshot of a live session. Expired sessions are evicted and reported
    /// as not found.
    pub fn get(&self, id: &str) -> Result<Session> {
        let now = Instant::now();
        let mut sessions = self.lock_sessions()?;
        match sessions.get(id) {
            Some(session) if !session.is_expired_at(now) => Ok(session.clone()),
            Some(_) => {
                sessions.remove(id);
                tracing::debug!(session_id = %id, "session expired on lookup");
                Err(not_found(id))
            }
            None => Err(not_found(id)),
        }
    }

    /// Set the session's assertion. It can be set exactly once.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty or oversized assertion
    /// - `NotFound` if no session has this id
    /// - `Expired` if the session exists but its TTL elapsed (it is evicted)
    /// - `Conflict` if an assertion is already stored
    pub fn store_assertion(&self, id: &str, assertion: &str) -> Result<()> {
        validate_assertion(assertion)?;

        let now = Instant::now();
        let mut sessions = self.lock_sessions()?;
        let Some(session) = sessions.get_mut(id) else {
            return Err(not_found(id));
        };
        if session.is_expired_at(now) {
            sessions.remove(id);
            return Err(SealnoteError::Expired(format!("session {}", id)));
        }
        if session.assertion.is_some() {
            return Err(SealnoteError::Conflict(format!(
                "session {} already has an assertion",
                id
            )));
        }
        session.assertion = Some(assertion.to_string());
        tracing::debug!(session_id = %id, "assertion stored");
        Ok(())
    }

    /// Remove a session after its assertion was accepted.
    pub fn consume(&self, id: &str) -> Result<Session> {
        let now = Instant::now();
        let mut sessions = self.lock_sessions()?;
        match sessions.remove(id) {
            Some(session) if !session.is_expired_at(now) => {
                tracing::debug!(session_id = %id, "session consumed");
                Ok(session)
            }
            _ => Err(not_found(id)),
        }
    }

    /// Remove every expired session, returning how many were removed.
    pub fn sweep_expired(&self) -> Result<usize> {
        let now = Instant::now();
        let mut sessions = self.lock_sessions()?;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        Ok(before - sessions.len())
    }

    /// Number of sessions that have not expired.
    pub fn live_count(&self) -> Result<usize> {
        let now = Instant::now();
        let sessions = self.lock_sessions()?;
        Ok(sessions
            .values()
            .filter(|session| !session.is_expired_at(now))
            .count())
    }
}

fn not_found(id: &str) -> SealnoteError {
    SealnoteError::NotFound(format!("session {}", id))
}
