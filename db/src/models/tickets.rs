use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, FromJsonQueryResult, QueryOrder};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tickets")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,
    pub description: String,

    pub status: TicketStatus,
    pub priority: TicketPriority,

    pub assigned_to: Option<String>,
    pub category_id: Option<String>,

    pub user_name: String,
    pub user_email: String,

    pub widget_id: Option<String>,
    pub department: Option<String>,
    pub source: Option<String>,

    #[sea_orm(column_type = "Json", nullable)]
    pub metadata: Option<TicketMetadata>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_status")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketStatus {
    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "assigned")]
    Assigned,

    #[sea_orm(string_value = "closed")]
    Closed,
}

#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "ticket_priority")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TicketPriority {
    #[sea_orm(string_value = "low")]
    Low,

    #[sea_orm(string_value = "medium")]
    Medium,

    #[sea_orm(string_value = "high")]
    High,

    #[sea_orm(string_value = "urgent")]
    Urgent,
}

impl TicketPriority {
    /// Canonicalizes caller-supplied priority text.
    ///
    /// Input is matched case-insensitively; anything unrecognized or absent
    /// becomes `Medium`.
    pub fn normalize(input: Option<&str>) -> Self {
        input
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(TicketPriority::Medium)
    }
}

/// Free-form submission context captured by the widget.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetadata {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub referrer: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub screen_size: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::messages::Entity")]
    Messages,
}

impl Related<super::messages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Messages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mints a ticket identifier from the creation instant.
pub fn new_ticket_id(now: DateTime<Utc>) -> String {
    format!("TICKET-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Field set for creating a ticket.
#[derive(Debug, Clone, Default)]
pub struct NewTicket {
    /// Caller-supplied id; minted from the clock when empty.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub priority: Option<String>,
    pub user_name: String,
    pub user_email: String,
    pub category_id: Option<String>,
    pub widget_id: Option<String>,
    pub department: Option<String>,
    pub source: Option<String>,
    pub metadata: Option<TicketMetadata>,
}

impl Model {
    pub async fn create(db: &DbConn, ticket: NewTicket) -> Result<Model, DbErr> {
        let now = Utc::now();
        let id = ticket
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| new_ticket_id(now));

        let active = ActiveModel {
            id: Set(id),
            title: Set(ticket.title),
            description: Set(ticket.description),
            status: Set(TicketStatus::Open),
            priority: Set(TicketPriority::normalize(ticket.priority.as_deref())),
            assigned_to: Set(None),
            category_id: Set(ticket.category_id),
            user_name: Set(ticket.user_name),
            user_email: Set(ticket.user_email),
            widget_id: Set(ticket.widget_id),
            department: Set(ticket.department),
            source: Set(ticket.source),
            metadata: Set(ticket.metadata),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(db).await
    }

    pub async fn find_by_id(db: &DbConn, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Most recently updated first.
    pub async fn find_all(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .order_by_desc(Column::UpdatedAt)
            .all(db)
            .await
    }
}
