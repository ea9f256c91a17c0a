//! HTTP transport to a relay service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;

use sealnote_core::unlock::{RelayClient, SessionStatus};
use sealnote_core::{Result, SealnoteError};

use crate::constants::RELAY_REQUEST_TIMEOUT_SECONDS;

pub struct HttpRelayClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRelayClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(RELAY_REQUEST_TIMEOUT_SECONDS))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn session_url(&self, session_id: &str) -> String {
        format!(
            "{}/api/session/{}",
            self.base_url,
            urlencoding::encode(session_id)
        )
    }
}

/// Transport failures are transient from the caller's point of view.
fn transport_error(err: reqwest::Error) -> SealnoteError {
    SealnoteError::Storage(format!("Relay unreachable: {}", err))
}

/// Map an error response onto the core taxonomy, keeping the relay's message.
async fn api_error(resp: reqwest::Response) -> SealnoteError {
    let status = resp.status();
    let body: serde_json::Value = resp.json().await.unwrap_or_default();
    let message = body
        .get("error")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Request failed ({})", status));

    match status {
        StatusCode::BAD_REQUEST => SealnoteError::Validation(message),
        StatusCode::NOT_FOUND => SealnoteError::NotFound(message),
        StatusCode::CONFLICT => SealnoteError::Conflict(message),
        StatusCode::SERVICE_UNAVAILABLE => SealnoteError::Capacity(message),
        _ => SealnoteError::Storage(message),
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn create_session(&self, session_id: &str, challenge: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/api/session", self.base_url))
            .json(&json!({ "sessionId": session_id, "challenge": challenge }))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }

    async fn poll_session(&self, session_id: &str) -> Result<SessionStatus> {
        let resp = self
            .client
            .get(self.session_url(session_id))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        resp.json::<SessionStatus>()
            .await
            .map_err(|e| SealnoteError::Validation(format!("Malformed relay response: {}", e)))
    }

    async fn store_assertion(&self, session_id: &str, assertion: &str) -> Result<()> {
        let resp = self
            .client
            .post(format!("{}/assertion", self.session_url(session_id)))
            .json(&json!({ "assertion": assertion }))
            .send()
            .await
            .map_err(transport_error)?;
        if !resp.status().is_success() {
            return Err(api_error(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sealnote_relay::{config::Config, create_router, state::AppState};

    async fn spawn_relay(max_sessions: usize) -> String {
        let config = Config {
            max_sessions,
            ..Config::default()
        };
        let app = create_router(Arc::new(AppState::new(config)));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_session_round_trip_over_http() {
        let client = HttpRelayClient::new(&spawn_relay(8).await).unwrap();

        client.create_session("s1", "c1").await.unwrap();
        let status = client.poll_session("s1").await.unwrap();
        assert_eq!(status.challenge, "c1");
        assert!(status.assertion.is_none());

        client.store_assertion("s1", "signed").await.unwrap();
        let status = client.poll_session("s1").await.unwrap();
        assert_eq!(status.assertion.as_deref(), Some("signed"));
    }

    #[tokio::test]
    async fn test_status_codes_map_to_core_errors() {
        let client = HttpRelayClient::new(&spawn_relay(1).await).unwrap();

        assert!(matches!(
            client.poll_session("missing").await,
            Err(SealnoteError::NotFound(_))
        ));
        assert!(matches!(
            client.create_session("bad id!", "c").await,
            Err(SealnoteError::Validation(_))
        ));

        client.create_session("s1", "c").await.unwrap();
        assert!(matches!(
            client.create_session("s2", "c").await,
            Err(SealnoteError::Capacity(_))
        ));

        client.store_assertion("s1", "a").await.unwrap();
        assert!(matches!(
            client.store_assertion("s1", "b").await,
            Err(SealnoteError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_retryable() {
        let client = HttpRelayClient::new("http://127.0.0.1:9").unwrap();
        let err = client.poll_session("s1").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
