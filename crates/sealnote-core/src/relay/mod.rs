//! Relay session store.
//!
//! A short-lived handoff point between the device that wants to unlock
//! (the initiator) and a second device holding a registered credential
//! (the responder):
//!
//! ```text
//! CREATED --store_assertion--> ASSERTION_STORED --consume--> CONSUMED
//!    \                               |
//!     `--------- now > expires_at ---+--> EXPIRED (same as not found)
//! ```
//!
//! The store is an explicitly owned value shared through `Arc`, never a
//! process global. [`SessionSweeper`] bounds memory by removing expired
//! sessions in the background.

mod session;
mod store;
mod sweeper;

use std::time::Duration;

use crate::error::{Result, SealnoteError};

pub use session::Session;
pub use store::SessionStore;
pub use sweeper::SessionSweeper;

/// Lifetime of every session.
pub const SESSION_TTL: Duration = Duration::from_secs(120);
/// Default cap on live sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1000;
/// Default sweep period.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

pub const MAX_SESSION_ID_LENGTH: usize = 128;
pub const MAX_CHALLENGE_LENGTH: usize = 512;
pub const MAX_ASSERTION_LENGTH: usize = 16 * 1024;

/// Session ids: 1 to 128 characters of `[A-Za-z0-9_-]`.
pub fn validate_session_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_SESSION_ID_LENGTH {
        return Err(SealnoteError::Validation(format!(
            "Session id must be 1 to {} characters",
            MAX_SESSION_ID_LENGTH
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(SealnoteError::Validation(
            "Session id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_challenge(challenge: &str) -> Result<()> {
    if challenge.is_empty() || challenge.len() > MAX_CHALLENGE_LENGTH {
        return Err(SealnoteError::Validation(format!(
            "Challenge must be 1 to {} characters",
            MAX_CHALLENGE_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_assertion(assertion: &str) -> Result<()> {
    if assertion.is_empty() || assertion.len() > MAX_ASSERTION_LENGTH {
        return Err(SealnoteError::Validation(format!(
            "Assertion must be 1 to {} bytes",
            MAX_ASSERTION_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_validation() {
        assert!(validate_session_id("s1").is_ok());
        assert!(validate_session_id("6f1c2d0a-1b2c-4d5e-8f90-0123456789ab").is_ok());
        assert!(validate_session_id("").is_err());
        assert!(validate_session_id("has space").is_err());
        assert!(validate_session_id("../etc").is_err());
        assert!(validate_session_id(&"a".repeat(MAX_SESSION_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_challenge_and_assertion_limits() {
        assert!(validate_challenge("C").is_ok());
        assert!(validate_challenge("").is_err());
        assert!(validate_challenge(&"c".repeat(MAX_CHALLENGE_LENGTH + 1)).is_err());
        assert!(validate_assertion("A").is_ok());
        assert!(validate_assertion("").is_err());
        assert!(validate_assertion(&"a".repeat(MAX_ASSERTION_LENGTH + 1)).is_err());
    }
}
