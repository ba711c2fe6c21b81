//! Outbound delivery of finished documents to the messaging API.

use async_trait::async_trait;
use serde_json::Value;

fn default_base_url() -> String {
    "https://api.pinnacle.sh".to_string()
}

/// How a send attempt failed. Each variant maps to a distinct user-facing
/// message; the Display strings are what the host surfaces as notices.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// Caller error, rejected before any network attempt.
    #[error("RCS payload must be a single JSON object, not an array")]
    ArrayPayload,
    /// The server answered with a non-success status.
    #[error("Request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    /// The request went out but no response came back.
    #[error("No response received from server: {0}")]
    NoResponse(String),
    /// The request could not be constructed or dispatched.
    #[error("Error setting up request: {0}")]
    Setup(String),
}

/// Delivers a document to the remote messaging API.
#[async_trait]
pub trait RemoteSender: Send + Sync + 'static {
    async fn send(&self, credential: &str, document: &Value) -> Result<Value, SendError>;
}

/// [`RemoteSender`] backed by the Pinnacle HTTP API.
pub struct PinnacleSender {
    client: reqwest::Client,
    base_url: String,
}

impl PinnacleSender {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl Default for PinnacleSender {
    fn default() -> Self {
        Self::new(default_base_url())
    }
}

#[async_trait]
impl RemoteSender for PinnacleSender {
    async fn send(&self, credential: &str, document: &Value) -> Result<Value, SendError> {
        if document.is_array() {
            return Err(SendError::ArrayPayload);
        }

        let url = format!("{}/send/rcs", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("PINNACLE-API-KEY", credential)
            .json(document)
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    SendError::Setup(e.to_string())
                } else {
                    SendError::NoResponse(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| SendError::NoResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn array_payload_rejected_before_network() {
        // An unroutable base URL proves the guard fires first.
        let sender = PinnacleSender::new("http://127.0.0.1:0");
        let err = sender
            .send("key", &json!([{"text": "hi"}]))
            .await
            .unwrap_err();
        assert!(matches!(err, SendError::ArrayPayload));
    }

    #[test]
    fn error_messages_are_distinct() {
        let status = SendError::Status {
            status: 403,
            body: "{\"error\":\"bad key\"}".into(),
        };
        assert_eq!(
            status.to_string(),
            "Request failed with status 403: {\"error\":\"bad key\"}"
        );
        assert_eq!(
            SendError::NoResponse("timed out".into()).to_string(),
            "No response received from server: timed out"
        );
        assert_eq!(
            SendError::Setup("bad url".into()).to_string(),
            "Error setting up request: bad url"
        );
    }
}
