#![forbid(unsafe_code)]

//! Blocking JSON client for the collaborator chat/document API.
//!
//! The remote service owns sessions, transcripts, document generation, and
//! publishing; this client only moves request/response JSON over HTTP. No
//! retries, one global timeout, typed wire shapes.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use ureq::Agent;

/// Global timeout for all HTTP operations.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base URL '{url}': {message}")]
    BadBaseUrl { url: String, message: String },

    #[error(transparent)]
    Http(#[from] ureq::Error),
}

#[derive(Debug, Serialize)]
struct ChatMessageRequest<'a> {
    session_id: Option<&'a str>,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct FinishRequest<'a> {
    session_id: &'a str,
    title: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub reply: String,
    #[serde(default)]
    pub finished: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryItem {
    pub sender: String,
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub session_id: String,
    pub title: String,
    pub content_markdown: String,
    #[serde(default)]
    pub confluence_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionItem {
    pub id: String,
    pub started_at: String,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub title: Option<String>,
}

impl SessionItem {
    /// `started_at` as a timestamp, when the server sent a valid RFC 3339
    /// string. Display code sorts sessions with this.
    pub fn started_at_parsed(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.started_at).ok()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionsResponse {
    pub items: Vec<SessionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub ok: bool,
}

/// Client for one API base URL.
#[derive(Clone)]
pub struct Client {
    base: String,
    agent: Agent,
}

impl Client {
    /// Validates the base URL (http/https only) and builds an agent with the
    /// global timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url).map_err(|e| ClientError::BadBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::BadBaseUrl {
                url: base_url.to_string(),
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(HTTP_TIMEOUT))
            .build()
            .into();

        Ok(Self {
            base: base_url.trim_end_matches('/').to_string(),
            agent,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// `POST /chat/message` — send one user message; a `None` session id asks
    /// the server to open a new session.
    pub fn send_message(&self, session_id: Option<&str>, message: &str) -> Result<ChatReply> {
        tracing::debug!(session_id, "sending chat message");
        Ok(self
            .agent
            .post(&self.endpoint("/chat/message"))
            .send_json(ChatMessageRequest {
                session_id,
                message,
            })?
            .body_mut()
            .read_json()?)
    }

    /// `GET /chat/history/{id}`
    pub fn get_history(&self, session_id: &str) -> Result<HistoryResponse> {
        Ok(self
            .agent
            .get(&self.endpoint(&format!("/chat/history/{session_id}")))
            .call()?
            .body_mut()
            .read_json()?)
    }

    /// `POST /chat/finish` — finalize the dialog into a document; the server
    /// may also publish it and return the published URL.
    pub fn finish_dialog(
        &self,
        session_id: &str,
        title: Option<&str>,
    ) -> Result<DocumentResponse> {
        tracing::debug!(session_id, "finishing dialog");
        Ok(self
            .agent
            .post(&self.endpoint("/chat/finish"))
            .send_json(FinishRequest { session_id, title })?
            .body_mut()
            .read_json()?)
    }

    /// `GET /sessions`
    pub fn list_sessions(&self) -> Result<SessionsResponse> {
        Ok(self
            .agent
            .get(&self.endpoint("/sessions"))
            .call()?
            .body_mut()
            .read_json()?)
    }

    /// `DELETE /sessions/{id}`
    pub fn delete_session(&self, session_id: &str) -> Result<Ack> {
        tracing::debug!(session_id, "deleting session");
        Ok(self
            .agent
            .delete(&self.endpoint(&format!("/sessions/{session_id}")))
            .call()?
            .body_mut()
            .read_json()?)
    }

    /// `GET /document/{id}`
    pub fn get_document(&self, session_id: &str) -> Result<DocumentResponse> {
        Ok(self
            .agent
            .get(&self.endpoint(&format!("/document/{session_id}")))
            .call()?
            .body_mut()
            .read_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = Client::new("http://localhost:8000/").unwrap();
        assert_eq!(
            client.endpoint("/chat/message"),
            "http://localhost:8000/chat/message"
        );
    }

    #[test]
    fn non_http_schemes_are_rejected() {
        assert!(matches!(
            Client::new("file:///etc/passwd"),
            Err(ClientError::BadBaseUrl { .. })
        ));
        assert!(matches!(
            Client::new("not a url"),
            Err(ClientError::BadBaseUrl { .. })
        ));
    }

    #[test]
    fn chat_message_request_serializes_to_the_wire_shape() {
        let body = serde_json::to_value(ChatMessageRequest {
            session_id: None,
            message: "привет",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"session_id": null, "message": "привет"})
        );
    }

    #[test]
    fn finish_request_serializes_optional_title() {
        let body = serde_json::to_value(FinishRequest {
            session_id: "s1",
            title: Some("BRD"),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"session_id": "s1", "title": "BRD"}));
    }

    #[test]
    fn reply_defaults_apply_when_fields_are_absent() {
        let reply: ChatReply =
            serde_json::from_str(r#"{"session_id":"s1","reply":"ok"}"#).unwrap();
        assert!(!reply.finished);
    }

    #[test]
    fn document_response_parses_with_and_without_publish_url() {
        let with: DocumentResponse = serde_json::from_str(
            r##"{"session_id":"s","title":"T","content_markdown":"# md","confluence_url":"http://c/x"}"##,
        )
        .unwrap();
        assert_eq!(with.confluence_url.as_deref(), Some("http://c/x"));

        let without: DocumentResponse = serde_json::from_str(
            r##"{"session_id":"s","title":"T","content_markdown":"# md","confluence_url":null}"##,
        )
        .unwrap();
        assert!(without.confluence_url.is_none());
    }

    #[test]
    fn session_timestamps_parse_as_rfc3339() {
        let item: SessionItem = serde_json::from_str(
            r#"{"id":"s","started_at":"2025-03-01T12:30:00+00:00","finished":true,"title":null}"#,
        )
        .unwrap();
        assert!(item.started_at_parsed().is_some());
        assert!(item.finished);

        let bad: SessionItem =
            serde_json::from_str(r#"{"id":"s","started_at":"yesterday"}"#).unwrap();
        assert!(bad.started_at_parsed().is_none());
    }
}
