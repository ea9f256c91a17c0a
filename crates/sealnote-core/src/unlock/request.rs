//! Out-of-band unlock request.
//!
//! The initiator shows this as a link or QR code:
//!
//! ```text
//! sealnote://unlock?session=<id>&challenge=<base64url>&relay=<url-encoded relay base>
//! ```

use crate::error::{Result, SealnoteError};
use crate::relay::{validate_challenge, validate_session_id};

const URI_PREFIX: &str = "sealnote://unlock?";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlockRequest {
    pub session_id: String,
    pub challenge: String,
    pub relay_url: String,
}

impl UnlockRequest {
    pub fn to_uri(&self) -> String {
        format!(
            "{}session={}&challenge={}&relay={}",
            URI_PREFIX,
            urlencoding::encode(&self.session_id),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.relay_url)
        )
    }

    pub fn parse(uri: &str) -> Result<Self> {
        let query = uri
            .trim()
            .strip_prefix(URI_PREFIX)
            .ok_or_else(|| SealnoteError::Validation("Not a sealnote unlock link".to_string()))?;

        let mut session_id = None;
        let mut challenge = None;
        let mut relay_url = None;
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(value)
                .map_err(|_| SealnoteError::Validation("Unlock link is not UTF-8".to_string()))?
                .into_owned();
            match name {
                "session" => session_id = Some(value),
                "challenge" => challenge = Some(value),
                "relay" => relay_url = Some(value),
                _ => {}
            }
        }

        let missing = |field: &str| SealnoteError::Validation(format!("Unlock link has no {}", field));
        let request = Self {
            session_id: session_id.ok_or_else(|| missing("session"))?,
            challenge: challenge.ok_or_else(|| missing("challenge"))?,
            relay_url: relay_url.ok_or_else(|| missing("relay"))?,
        };
        validate_session_id(&request.session_id)?;
        validate_challenge(&request.challenge)?;
        if request.relay_url.is_empty() {
            return Err(missing("relay"));
        }
        Ok(request)
    }
}
