use chrono::{TimeDelta, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DbConn};

use crate::error::StoreError;
use crate::models::messages::{self, NewMessageRecord};
use crate::models::tickets::{self, NewTicket};
use crate::test_utils::setup_test_db;

async fn seed_ticket(db: &DbConn, id: &str) -> tickets::Model {
    tickets::Model::create(
        db,
        NewTicket {
            id: Some(id.to_string()),
            title: "Checkout fails".into(),
            description: "The pay button does nothing".into(),
            priority: Some("HIGH".into()),
            user_name: "Carla".into(),
            user_email: "carla@example.com".into(),
            ..Default::default()
        },
    )
    .await
    .expect("seed ticket")
}

fn client_message(content: &str) -> NewMessageRecord {
    NewMessageRecord {
        content: content.into(),
        is_client: true,
        user_name: Some("Carla".into()),
        user_email: Some("carla@example.com".into()),
    }
}

#[tokio::test]
async fn append_assigns_id_and_touches_the_ticket() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101010").await;

    let message = messages::Model::append(&db, &ticket.id, client_message("Hello"))
        .await
        .expect("append");

    assert!(message.id.starts_with("MSG-"));
    assert!(message.is_client);
    assert_eq!(message.ticket_id, ticket.id);

    let reloaded = tickets::Model::find_by_id(&db, &ticket.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.updated_at >= ticket.updated_at);
    assert!((reloaded.updated_at - message.created_at).abs() < TimeDelta::seconds(1));
    assert!(reloaded.updated_at >= reloaded.created_at);
}

#[tokio::test]
async fn append_to_a_missing_ticket_is_not_found() {
    let db = setup_test_db().await;
    let err = messages::Model::append(&db, "TICKET-nope", client_message("Hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::TicketNotFound(_)));
}

#[tokio::test]
async fn history_preserves_insertion_order() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101011").await;

    for content in ["first", "second", "third"] {
        messages::Model::append(&db, &ticket.id, client_message(content))
            .await
            .unwrap();
    }

    let history = messages::Model::find_all_for_ticket(&db, &ticket.id)
        .await
        .unwrap();
    let contents: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn concurrent_appends_to_one_ticket_lose_nothing() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101012").await;

    let (a, b) = futures::join!(
        messages::Model::append(&db, &ticket.id, client_message("from the visitor")),
        messages::Model::append(&db, &ticket.id, client_message("from another tab")),
    );
    a.unwrap();
    b.unwrap();

    let history = messages::Model::find_all_for_ticket(&db, &ticket.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn recent_identical_content_is_a_duplicate() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101013").await;

    let stored = messages::Model::append(&db, &ticket.id, client_message("Hi there"))
        .await
        .unwrap();

    let hit = messages::Model::find_recent_duplicate(&db, &ticket.id, "Hi there")
        .await
        .unwrap()
        .expect("should match the just-stored message");
    assert_eq!(hit.id, stored.id);

    let miss = messages::Model::find_recent_duplicate(&db, &ticket.id, "Hi there!")
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn messages_older_than_the_window_are_not_duplicates() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101014").await;

    // Stored well outside the 5-second window.
    messages::ActiveModel {
        id: Set(messages::new_message_id()),
        ticket_id: Set(ticket.id.clone()),
        content: Set("Hi there".into()),
        is_client: Set(false),
        user_name: Set(Some("Ana".into())),
        user_email: Set(None),
        created_at: Set(Utc::now() - TimeDelta::seconds(30)),
    }
    .insert(&db)
    .await
    .unwrap();

    let miss = messages::Model::find_recent_duplicate(&db, &ticket.id, "Hi there")
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn duplicates_are_scoped_to_their_ticket() {
    let db = setup_test_db().await;
    let first = seed_ticket(&db, "TICKET-20260510-101015").await;
    let second = seed_ticket(&db, "TICKET-20260510-101016").await;

    messages::Model::append(&db, &first.id, client_message("same words"))
        .await
        .unwrap();

    let miss = messages::Model::find_recent_duplicate(&db, &second.id, "same words")
        .await
        .unwrap();
    assert!(miss.is_none());
}

#[tokio::test]
async fn wire_form_carries_both_timestamp_keys() {
    let db = setup_test_db().await;
    let ticket = seed_ticket(&db, "TICKET-20260510-101017").await;
    let stored = messages::Model::append(&db, &ticket.id, client_message("Hello"))
        .await
        .unwrap();

    let wire = common::envelope::WireMessage::from(&stored);
    assert_eq!(wire.created_at, wire.timestamp);
    assert_eq!(wire.id, stored.id);
    assert!(wire.is_client);
}
