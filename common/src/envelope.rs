//! Socket protocol envelopes shared by both services.
//!
//! Inbound frames are decoded into a tagged union and normalized once at the
//! transport boundary: the deployed widget clients send the payload under
//! either `data` or `message`, and the text under either `content` or
//! `message`. Everything past [`NewMessageFrame::normalize`] sees exactly one
//! canonical shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Wire form of a chat message.
///
/// `created_at` and `timestamp` carry the same RFC-3339 instant; older
/// clients read one key, newer ones the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    pub id: String,
    pub content: String,
    pub is_client: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub created_at: String,
    pub timestamp: String,
}

impl WireMessage {
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        is_client: bool,
        user_name: Option<String>,
        user_email: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let ts = created_at.to_rfc3339();
        Self {
            id: id.into(),
            content: content.into(),
            is_client,
            user_name,
            user_email,
            created_at: ts.clone(),
            timestamp: ts,
        }
    }
}

/// Envelope payload: a single message, an ordered history, or a free-form
/// control body.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Message(WireMessage),
    History(Vec<WireMessage>),
    Info(serde_json::Value),
}

/// Outbound envelope written to socket clients.
///
/// `new_message` mirrors its payload under both `data` and `message`, and
/// `message_history` under both `data` and `messages`, because deployed
/// clients read either key.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outbound {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<WireMessage>>,
}

impl Outbound {
    fn bare(kind: &'static str, ticket_id: Option<String>) -> Self {
        Self {
            kind,
            ticket_id,
            data: None,
            message: None,
            messages: None,
        }
    }

    /// Welcome envelope sent to a connection immediately after registration.
    pub fn connection_established(ticket_id: &str) -> Self {
        let mut env = Self::bare("connection_established", Some(ticket_id.to_string()));
        env.data = Some(Payload::Info(json!({
            "message": "Connection established",
            "ticketId": ticket_id,
            "status": "connected",
        })));
        env
    }

    /// Full ordered history replay, sent before any live traffic.
    pub fn message_history(ticket_id: &str, history: Vec<WireMessage>) -> Self {
        let mut env = Self::bare("message_history", Some(ticket_id.to_string()));
        env.data = Some(Payload::History(history.clone()));
        env.messages = Some(history);
        env
    }

    /// Live broadcast of a newly stored message.
    pub fn new_message(ticket_id: &str, msg: WireMessage) -> Self {
        let mut env = Self::bare("new_message", Some(ticket_id.to_string()));
        env.message = Some(Payload::Message(msg.clone()));
        env.data = Some(Payload::Message(msg));
        env
    }

    /// Acknowledgement sent only to the connection that submitted a message.
    pub fn message_received(ticket_id: &str, msg: WireMessage) -> Self {
        let mut env = Self::bare("message_received", Some(ticket_id.to_string()));
        env.data = Some(Payload::Message(msg));
        env
    }

    pub fn pong() -> Self {
        let mut env = Self::bare("pong", None);
        env.data = Some(Payload::Info(json!({
            "time": Utc::now().to_rfc3339(),
        })));
        env
    }

    pub fn identify_success(ticket_id: &str, user_id: Option<String>) -> Self {
        let mut env = Self::bare("identify_success", Some(ticket_id.to_string()));
        env.data = Some(Payload::Info(json!({
            "message": "Identification successful",
            "userId": user_id,
        })));
        env
    }

    /// Serializes to the text frame written on the wire.
    pub fn to_text(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(text) => Some(text),
            Err(e) => {
                // Outbound envelopes are plain data; this only fires on a bug.
                tracing::error!("failed to serialize outbound envelope: {e}");
                None
            }
        }
    }
}

/// Inbound frame decoded from client text.
///
/// Frames without a recognized `type` discriminator fail to decode; callers
/// log and drop them without closing the connection.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    Ping,
    Pong,
    Identify {
        #[serde(default, rename = "userId")]
        user_id: Option<String>,
    },
    #[serde(alias = "client_message")]
    NewMessage(NewMessageFrame),
}

/// Raw `new_message` frame before normalization.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageFrame {
    #[serde(default, alias = "message")]
    pub data: Option<BodyOrText>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// The payload slot holds either a structured body or bare text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BodyOrText {
    Body(NewMessageBody),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageBody {
    #[serde(default, alias = "message")]
    pub content: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_email: Option<String>,
}

/// Canonical new-message submission after wire-shape normalization.
///
/// Carries no authorship flag: `isClient` is fixed by the ingestion path, so
/// anything the client claimed is discarded here.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub content: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl NewMessageFrame {
    /// Collapses the accepted wire shapes into one canonical submission.
    ///
    /// Returns `None` when no non-empty content is present anywhere.
    pub fn normalize(self) -> Option<NewMessage> {
        let (body_content, body_name, body_email) = match self.data {
            Some(BodyOrText::Body(body)) => (body.content, body.user_name, body.user_email),
            Some(BodyOrText::Text(text)) => (Some(text), None, None),
            None => (None, None, None),
        };

        let content = body_content
            .or(self.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())?;

        Some(NewMessage {
            content,
            user_name: body_name.or(self.user_name),
            user_email: body_email.or(self.user_email),
        })
    }
}
