//! Cross-service HTTP notification bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relay → backend: ticket creation relayed from the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketNotification {
    /// The relay's locally minted ticket id; the backend keeps it so the two
    /// stores converge on one identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub category_id: Option<String>,
    pub priority: String,
    pub user_name: String,
    pub user_email: String,
    /// Always `true`: widget-originated tickets are authored by the visitor.
    pub is_client: bool,
    pub metadata: Value,
}

/// Relay → backend: visitor message relayed from the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMessageNotification {
    pub ticket_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Always `true` on this path; the receiving endpoint ignores it anyway.
    pub is_client: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// Backend → relay: agent (or echoed) message for widget-side fan-out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessageNotification {
    pub ticket_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
}

/// Header identifying relayed widget traffic at the backend.
pub const HEADER_MESSAGE_SOURCE: &str = "X-Message-Source";
pub const MESSAGE_SOURCE_WIDGET: &str = "widget-client";
pub const HEADER_SOURCE: &str = "X-Source";
pub const SOURCE_WIDGET: &str = "widget";
pub const HEADER_WIDGET_ID: &str = "X-Widget-ID";
