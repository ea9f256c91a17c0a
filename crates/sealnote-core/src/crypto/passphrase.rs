//! Passphrase policy for new vaults.
//!
//! Applied when a passphrase is chosen (setup, change). Unlock never
//! validates policy: an old vault with a weaker passphrase must still open.

use crate::error::{Result, SealnoteError};

/// Minimum passphrase length in characters.
const MIN_PASSPHRASE_CHARS: usize = 8;

/// Validate that a new passphrase meets the minimum requirements.
///
/// # Requirements
///
/// - Not empty or only whitespace
/// - At least 8 characters (counted as Unicode scalar values)
///
/// # Examples
///
/// ```
/// use sealnote_core::crypto::validate_passphrase;
///
/// assert!(validate_passphrase("correct horse battery").is_ok());
/// assert!(validate_passphrase("short").is_err());
/// ```
pub fn validate_passphrase(passphrase: &str) -> Result<()> {
    if passphrase.trim().is_empty() {
        return Err(SealnoteError::Validation(
            "Passphrase cannot be empty".to_string(),
        ));
    }

    let chars = passphrase.chars().count();
    if chars < MIN_PASSPHRASE_CHARS {
        return Err(SealnoteError::Validation(format!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_CHARS, chars
        )));
    }

    Ok(())
}
