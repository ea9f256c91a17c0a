use serde::Serialize;
use tokio::time::Instant;

/// Snapshot of a relay session.
///
/// The store owns the live value; callers only ever see clones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub challenge: String,
    pub assertion: Option<String>,
    /// Unix milliseconds
    pub created_at: i64,
    /// Unix milliseconds
    pub expires_at: i64,
    #[serde(skip)]
    pub(crate) deadline: Instant,
}

impl Session {
    /// Expired once the clock is strictly past the deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now > self.deadline
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> std::time::Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}
