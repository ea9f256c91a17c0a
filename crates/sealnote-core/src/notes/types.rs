use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crypto::{NONCE_LENGTH, TAG_LENGTH};
use crate::encoding::b64;
use crate::error::{Result, SealnoteError};

/// A stored note. Only `ciphertext` is confidential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,

    /// Body ciphertext with the GCM tag appended
    #[serde(with = "b64")]
    pub ciphertext: Vec<u8>,

    /// Nonce used for this ciphertext, never reused
    #[serde(with = "b64")]
    pub iv: Vec<u8>,

    /// Unix milliseconds
    pub created_at: i64,

    /// Unix milliseconds, bumped on every edit
    pub updated_at: i64,
}

impl Note {
    /// Structural checks for notes arriving from outside (backups).
    pub fn validate(&self) -> Result<()> {
        if self.iv.len() != NONCE_LENGTH {
            return Err(SealnoteError::Validation(format!(
                "Note {} has a malformed iv",
                self.id
            )));
        }
        if self.ciphertext.len() < TAG_LENGTH {
            return Err(SealnoteError::Validation(format!(
                "Note {} has a truncated ciphertext",
                self.id
            )));
        }
        if self.updated_at < self.created_at {
            return Err(SealnoteError::Validation(format!(
                "Note {} was updated before it was created",
                self.id
            )));
        }
        Ok(())
    }
}

/// A note with its body decrypted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedNote {
    pub id: Uuid,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}
