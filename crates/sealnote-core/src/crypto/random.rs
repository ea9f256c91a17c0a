//! OS entropy helpers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{Result, SealnoteError};

/// Length of a remote-unlock challenge in bytes.
pub const CHALLENGE_LENGTH: usize = 32;

/// Fill a fixed-size array from the operating system's CSPRNG.
pub fn random_array<const N: usize>() -> Result<[u8; N]> {
    let mut bytes = [0u8; N];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| SealnoteError::Crypto(format!("Failed to gather entropy: {}", e)))?;
    Ok(bytes)
}

/// Generate a random challenge, encoded as unpadded base64url.
///
/// This is the encoding authenticators echo back inside `clientDataJSON`.
pub fn random_challenge() -> Result<String> {
    let bytes = random_array::<CHALLENGE_LENGTH>()?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
