use chrono::{DateTime, TimeDelta, Utc};
use common::envelope::WireMessage;
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::tickets;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub ticket_id: String,

    pub content: String,

    /// Authored by the requester (`true`) or an agent (`false`).
    /// Fixed at ingestion; never rewritten.
    pub is_client: bool,

    pub user_name: Option<String>,
    pub user_email: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tickets::Entity",
        from = "Column::TicketId",
        to = "super::tickets::Column::Id"
    )]
    Ticket,
}

impl Related<super::tickets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Mints a message identifier. Uniqueness is the only hard requirement.
pub fn new_message_id() -> String {
    format!("MSG-{}", Uuid::new_v4())
}

/// How far back an identical-content message counts as a re-delivery.
pub fn duplicate_window() -> TimeDelta {
    TimeDelta::seconds(5)
}

/// Field set for appending a message; id and timestamp are assigned here.
#[derive(Debug, Clone)]
pub struct NewMessageRecord {
    pub content: String,
    pub is_client: bool,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl Model {
    /// Appends a message to an existing ticket and refreshes the ticket's
    /// `updated_at`, both inside one transaction so concurrent appends to the
    /// same ticket serialize without losing either write.
    pub async fn append(
        db: &DbConn,
        ticket_id: &str,
        record: NewMessageRecord,
    ) -> Result<Model, StoreError> {
        let now = Utc::now();
        let txn = db.begin().await.map_err(StoreError::Db)?;

        let ticket = tickets::Entity::find_by_id(ticket_id)
            .one(&txn)
            .await
            .map_err(StoreError::Db)?
            .ok_or_else(|| StoreError::TicketNotFound(ticket_id.to_string()))?;

        let message = ActiveModel {
            id: Set(new_message_id()),
            ticket_id: Set(ticket_id.to_string()),
            content: Set(record.content),
            is_client: Set(record.is_client),
            user_name: Set(record.user_name),
            user_email: Set(record.user_email),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(StoreError::Db)?;

        let mut ticket: tickets::ActiveModel = ticket.into();
        ticket.updated_at = Set(now);
        ticket.update(&txn).await.map_err(StoreError::Db)?;

        txn.commit().await.map_err(StoreError::Db)?;
        Ok(message)
    }

    /// Full ordered history for a ticket (insertion order).
    pub async fn find_all_for_ticket(db: &DbConn, ticket_id: &str) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Looks for a message with identical content stored within the
    /// duplicate window. Backs the agent-path idempotence guard against
    /// cross-service redelivery.
    pub async fn find_recent_duplicate(
        db: &DbConn,
        ticket_id: &str,
        content: &str,
    ) -> Result<Option<Model>, DbErr> {
        let cutoff = Utc::now() - duplicate_window();
        Entity::find()
            .filter(Column::TicketId.eq(ticket_id))
            .filter(Column::Content.eq(content))
            .filter(Column::CreatedAt.gt(cutoff))
            .order_by_desc(Column::CreatedAt)
            .one(db)
            .await
    }
}

impl From<&Model> for WireMessage {
    fn from(m: &Model) -> Self {
        WireMessage::new(
            m.id.clone(),
            m.content.clone(),
            m.is_client,
            m.user_name.clone(),
            m.user_email.clone(),
            m.created_at,
        )
    }
}
