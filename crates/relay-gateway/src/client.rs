//! HTTP client for the workflow-trigger endpoint

use crate::error::TriggerError;
use relay_model::QueryId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TRIGGER_PATH: &str = "/api/research-agent";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct TriggerRequest {
    #[serde(rename = "queryId")]
    query_id: QueryId,
}

/// Acknowledgement that a workflow was started
///
/// The backend answers before doing any work, so this carries no
/// progress. Progress arrives through the store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TriggerReceipt {
    /// Human-readable acknowledgement
    pub message: String,
    /// Echo of the query the workflow was started for
    #[serde(rename = "queryId")]
    pub query_id: QueryId,
    /// Outcome tag, "success" on the happy path
    pub status: String,
}

/// Bearer-authenticated client for starting research workflows
pub struct TriggerClient {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl TriggerClient {
    /// Create a client for the backend at `base_url`
    #[must_use]
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}{TRIGGER_PATH}", base_url.trim_end_matches('/')),
            token: token.into(),
        }
    }

    /// Ask the backend to start the workflow for `query_id`
    ///
    /// The backend spawns the pipeline and returns immediately. Errors
    /// here mean the workflow never started; once this returns a
    /// receipt, failures are reported as agent error records instead.
    pub async fn start_research(&self, query_id: QueryId) -> Result<TriggerReceipt, TriggerError> {
        tracing::debug!(%query_id, "triggering research workflow");
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(DEFAULT_TIMEOUT)
            .bearer_auth(&self.token)
            .json(&TriggerRequest { query_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_message(&body);
            tracing::warn!(%query_id, status = status.as_u16(), %message, "trigger refused");
            return Err(match status.as_u16() {
                401 | 403 => TriggerError::Unauthorized(message),
                code => TriggerError::Rejected {
                    status: code,
                    message,
                },
            });
        }

        let receipt: TriggerReceipt = response.json().await?;
        tracing::info!(%query_id, status = %receipt.status, "research workflow started");
        Ok(receipt)
    }
}

/// Pull the human-readable reason out of a failure body
///
/// Bodies are `{"detail": ...}` or `{"error": ...}` JSON; anything else
/// is passed through verbatim.
fn extract_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["detail", "error"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                return text.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "no error body".to_string()
    } else {
        body.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn extracts_detail_field() {
        let body = r#"{"detail": "Invalid authentication credentials"}"#;
        assert_eq!(extract_message(body), "Invalid authentication credentials");
    }

    #[test]
    fn extracts_error_field() {
        let body = r#"{"error": "query not found"}"#;
        assert_eq!(extract_message(body), "query not found");
    }

    #[test]
    fn detail_wins_over_error() {
        let body = r#"{"detail": "outer reason", "error": "inner reason"}"#;
        assert_eq!(extract_message(body), "outer reason");
    }

    #[test]
    fn non_json_body_passes_through() {
        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn empty_body_gets_placeholder() {
        assert_eq!(extract_message("  "), "no error body");
    }

    #[test]
    fn receipt_parses_backend_payload() {
        let id = QueryId::new();
        let json = format!(
            r#"{{"message": "research workflow started successfully", "queryId": "{id}", "status": "success", "langsmithEnabled": false}}"#
        );
        let receipt: TriggerReceipt = serde_json::from_str(&json).unwrap();
        assert_eq!(receipt.query_id, id);
        assert_eq!(receipt.status, "success");
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let client = TriggerClient::new("http://localhost:8000/", "token");
        assert_eq!(client.endpoint, "http://localhost:8000/api/research-agent");
    }
}
