//! Responder side of remote unlock.

use super::client::RelayClient;
use super::request::UnlockRequest;
use crate::error::{Result, SealnoteError};
use crate::webauthn::SoftwareAuthenticator;

/// Sign the request's challenge and post the assertion to the relay.
///
/// The relay's copy of the challenge must match the link; a mismatch means
/// the link or the relay was tampered with and nothing is signed.
pub async fn respond<C: RelayClient + ?Sized>(
    client: &C,
    request: &UnlockRequest,
    authenticator: &mut SoftwareAuthenticator,
    origin: &str,
) -> Result<()> {
    let status = client.poll_session(&request.session_id).await?;
    if status.challenge != request.challenge {
        return Err(SealnoteError::Validation(
            "Relay challenge does not match the unlock link".to_string(),
        ));
    }
    if status.assertion.is_some() {
        return Err(SealnoteError::Conflict(
            "Session already answered".to_string(),
        ));
    }

    let assertion = authenticator.sign(&request.challenge, origin)?;
    client
        .store_assertion(&request.session_id, &assertion.to_json()?)
        .await?;
    tracing::info!(session_id = %request.session_id, "assertion sent");
    Ok(())
}
