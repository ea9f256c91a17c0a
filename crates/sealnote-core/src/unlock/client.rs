use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::relay::SessionStore;

/// What the initiator sees when polling a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub assertion: Option<String>,
    /// Unix milliseconds
    pub expires_at: i64,
    pub challenge: String,
}

/// Transport to a relay.
///
/// Errors use the core taxonomy: an absent or expired session is
/// `NotFound`, a full relay is `Capacity`, a second assertion is
/// `Conflict`. Network failures should map to `Storage` so the polling
/// loop treats them as transient. Timeouts are the implementation's job.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn create_session(&self, session_id: &str, challenge: &str) -> Result<()>;

    async fn poll_session(&self, session_id: &str) -> Result<SessionStatus>;

    async fn store_assertion(&self, session_id: &str, assertion: &str) -> Result<()>;

    /// Drop a session the initiator no longer needs. Relays without an
    /// explicit delete let it expire.
    async fn release_session(&self, _session_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Direct, in-process relay.
#[async_trait]
impl RelayClient for SessionStore {
    async fn create_session(&self, session_id: &str, challenge: &str) -> Result<()> {
        self.create(session_id, challenge).map(|_| ())
    }

    async fn poll_session(&self, session_id: &str) -> Result<SessionStatus> {
        let session = self.get(session_id)?;
        Ok(SessionStatus {
            assertion: session.assertion,
            expires_at: session.expires_at,
            challenge: session.challenge,
        })
    }

    async fn store_assertion(&self, session_id: &str, assertion: &str) -> Result<()> {
        SessionStore::store_assertion(self, session_id, assertion)
    }

    async fn release_session(&self, session_id: &str) -> Result<()> {
        self.consume(session_id).map(|_| ())
    }
}

#[async_trait]
impl<C: RelayClient + ?Sized> RelayClient for std::sync::Arc<C> {
    async fn create_session(&self, session_id: &str, challenge: &str) -> Result<()> {
        (**self).create_session(session_id, challenge).await
    }

    async fn poll_session(&self, session_id: &str) -> Result<SessionStatus> {
        (**self).poll_session(session_id).await
    }

    async fn store_assertion(&self, session_id: &str, assertion: &str) -> Result<()> {
        (**self).store_assertion(session_id, assertion).await
    }

    async fn release_session(&self, session_id: &str) -> Result<()> {
        (**self).release_session(session_id).await
    }
}
