use serde::{Deserialize, Serialize};

use super::error::VerifyError;
use crate::encoding::{b64, b64url};
use crate::error::{Result, SealnoteError};

/// Ceremony type for assertions.
pub const TYPE_GET: &str = "webauthn.get";
/// Ceremony type for registrations.
pub const TYPE_CREATE: &str = "webauthn.create";

/// A signed assertion as relayed between devices (JSON, base64url fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assertion {
    /// base64url credential id
    pub credential_id: String,

    #[serde(rename = "clientDataJSON", with = "b64url")]
    pub client_data_json: Vec<u8>,

    #[serde(with = "b64url")]
    pub authenticator_data: Vec<u8>,

    #[serde(with = "b64url")]
    pub signature: Vec<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

impl Assertion {
    /// Parse the JSON form carried in a relay session.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SealnoteError::Validation(format!("Malformed assertion: {}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The client data the browser (or authenticator host) signs over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientData {
    #[serde(rename = "type")]
    pub ceremony: String,

    /// base64url challenge
    pub challenge: String,

    pub origin: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub cross_origin: bool,
}

impl ClientData {
    pub(crate) fn parse(bytes: &[u8]) -> std::result::Result<Self, VerifyError> {
        serde_json::from_slice(bytes).map_err(|_| VerifyError::MalformedClientData)
    }
}

/// A registered credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    /// base64url credential id
    pub id: String,

    /// COSE_Key (or SPKI DER) public key bytes
    #[serde(with = "b64")]
    pub public_key: Vec<u8>,

    /// Last accepted signature counter
    pub counter: u32,

    /// Unix milliseconds
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_json_field_names() {
        let assertion = Assertion {
            credential_id: "abc".to_string(),
            client_data_json: b"{}".to_vec(),
            authenticator_data: vec![1, 2, 3],
            signature: vec![4, 5],
            user_handle: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&assertion.to_json().unwrap()).unwrap();
        assert_eq!(json["credentialId"], "abc");
        assert_eq!(json["clientDataJSON"], "e30");
        assert_eq!(json["authenticatorData"], "AQID");
        assert!(json.get("userHandle").is_none());
    }

    #[test]
    fn test_assertion_from_json_rejects_garbage() {
        assert!(matches!(
            Assertion::from_json("not json"),
            Err(SealnoteError::Validation(_))
        ));
    }

    #[test]
    fn test_client_data_parse() {
        let data = ClientData::parse(
            br#"{"type":"webauthn.get","challenge":"abc","origin":"https://x","extra":1}"#,
        )
        .unwrap();
        assert_eq!(data.ceremony, TYPE_GET);
        assert!(!data.cross_origin);
        assert_eq!(
            ClientData::parse(b"{").unwrap_err(),
            VerifyError::MalformedClientData
        );
    }
}
