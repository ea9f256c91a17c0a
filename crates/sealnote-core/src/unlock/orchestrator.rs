//! Initiator side of remote unlock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use super::client::RelayClient;
use super::request::UnlockRequest;
use crate::crypto::random_challenge;
use crate::encoding::decode_b64url;
use crate::error::{Result, SealnoteError};
use crate::relay::SESSION_TTL;
use crate::storage::KeyValueStore;
use crate::webauthn::{Assertion, CredentialRegistry, CredentialVerifier};

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct UnlockConfig {
    /// Relay base URL published in the unlock link
    pub relay_url: String,
    pub poll_interval: Duration,
    /// Hard deadline for the whole wait, capped at the session TTL
    pub timeout: Duration,
}

impl UnlockConfig {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: SESSION_TTL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// How a remote unlock attempt ended.
///
/// `Authenticated` proves possession of a registered credential. It carries
/// no key material: the master key is still only reachable through the
/// passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteUnlockOutcome {
    Authenticated { credential_id: String, sign_count: u32 },
    Rejected { reason: String },
    TimedOut,
    Cancelled,
}

/// Cancels a pending wait. Cloneable; any clone may cancel.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<watch::Sender<bool>>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

/// A created session waiting for a responder.
#[derive(Debug)]
pub struct PendingUnlock {
    request: UnlockRequest,
    challenge: Vec<u8>,
    deadline: Instant,
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl PendingUnlock {
    /// Session id, challenge and relay to hand to the responder.
    pub fn request(&self) -> &UnlockRequest {
        &self.request
    }

    pub fn uri(&self) -> String {
        self.request.to_uri()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel_tx))
    }
}

/// Drives session creation, polling, and verification.
pub struct RemoteUnlock<C> {
    client: C,
    verifier: CredentialVerifier,
    config: UnlockConfig,
}

impl<C: RelayClient> RemoteUnlock<C> {
    pub fn new(client: C, verifier: CredentialVerifier, config: UnlockConfig) -> Self {
        Self {
            client,
            verifier,
            config,
        }
    }

    /// Generate a session id and challenge and open the session on the relay.
    pub async fn begin(&self) -> Result<PendingUnlock> {
        let session_id = Uuid::new_v4().to_string();
        let challenge = random_challenge()?;
        let challenge_bytes = decode_b64url(&challenge)
            .map_err(|_| SealnoteError::Crypto("Challenge encoding failed".to_string()))?;

        self.client.create_session(&session_id, &challenge).await?;
        tracing::info!(session_id = %session_id, "remote unlock session opened");

        let (cancel_tx, cancel_rx) = watch::channel(false);
        Ok(PendingUnlock {
            request: UnlockRequest {
                session_id,
                challenge,
                relay_url: self.config.relay_url.clone(),
            },
            challenge: challenge_bytes,
            deadline: Instant::now() + self.config.timeout.min(SESSION_TTL),
            cancel_tx: Arc::new(cancel_tx),
            cancel_rx,
        })
    }

    /// Poll until an assertion arrives, the deadline passes, or the wait is
    /// cancelled, then verify the assertion.
    ///
    /// Relay errors that are retryable (absent session, network trouble)
    /// are retried on the next tick. Anything else ends the wait with an
    /// error. A verified assertion must also advance the credential's
    /// signature counter.
    pub async fn wait<S: KeyValueStore + ?Sized>(
        &self,
        pending: PendingUnlock,
        registry: &CredentialRegistry<'_, S>,
    ) -> Result<RemoteUnlockOutcome> {
        let PendingUnlock {
            request,
            challenge,
            deadline,
            cancel_tx: _cancel_tx,
            mut cancel_rx,
        } = pending;
        let session_id = request.session_id.as_str();

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancelled(&mut cancel_rx) => break Ok(RemoteUnlockOutcome::Cancelled),
                _ = tokio::time::sleep_until(deadline) => break Ok(RemoteUnlockOutcome::TimedOut),
                _ = ticker.tick() => {
                    match self.client.poll_session(session_id).await {
                        Ok(status) => {
                            if let Some(assertion) = status.assertion {
                                break self.evaluate(&assertion, &challenge, registry);
                            }
                        }
                        Err(e) if e.is_retryable() => {
                            tracing::debug!(session_id, error = %e, "poll failed, retrying");
                        }
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        // Release on every exit path, errors included.
        if let Err(e) = self.client.release_session(session_id).await {
            tracing::debug!(session_id, error = %e, "session release failed");
        }
        let outcome = outcome?;
        tracing::info!(session_id, outcome = ?outcome, "remote unlock finished");
        Ok(outcome)
    }

    fn evaluate<S: KeyValueStore + ?Sized>(
        &self,
        raw_assertion: &str,
        challenge: &[u8],
        registry: &CredentialRegistry<'_, S>,
    ) -> Result<RemoteUnlockOutcome> {
        let rejected = |reason: &str| RemoteUnlockOutcome::Rejected {
            reason: reason.to_string(),
        };

        let Ok(assertion) = Assertion::from_json(raw_assertion) else {
            return Ok(rejected("malformed assertion"));
        };
        let Some(credential) = registry.find(&assertion.credential_id)? else {
            return Ok(rejected("unknown credential"));
        };
        let auth_data = match self
            .verifier
            .try_verify(&assertion, &credential.public_key, challenge)
        {
            Ok(auth_data) => auth_data,
            Err(reason) => {
                tracing::warn!(credential_id = %credential.id, %reason, "assertion rejected");
                return Ok(rejected("assertion did not verify"));
            }
        };
        match registry.record_assertion_counter(&credential.id, auth_data.sign_count) {
            Ok(_) => Ok(RemoteUnlockOutcome::Authenticated {
                credential_id: credential.id,
                sign_count: auth_data.sign_count,
            }),
            Err(SealnoteError::Conflict(_)) => Ok(rejected("signature counter did not increase")),
            Err(e) => Err(e),
        }
    }
}

/// Resolves once the flag is set. A dropped sender never cancels.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
