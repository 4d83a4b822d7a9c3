use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use db::models::{messages::Model as MessageModel, tickets};
use sea_orm::DbConn;
use serde_json::{Value, json};
use serial_test::serial;
use tower::ServiceExt;
use util::config::AppConfig;
use util::notifier::Notifier;
use util::state::AppState;
use util::ws::ConnectionRegistry;

use crate::routes::routes;

/// State with a notifier aimed at a dead loopback port: peer notifications
/// fail in the background and only log, like a peer being down.
async fn test_state() -> AppState {
    let db = db::test_utils::setup_test_db().await;
    let notifier = Notifier::new("http://127.0.0.1:9", "", Vec::new());
    AppState::new(db, ConnectionRegistry::new(), notifier)
}

async fn seed_ticket(db: &DbConn, id: &str) -> tickets::Model {
    tickets::Model::create(
        db,
        tickets::NewTicket {
            id: Some(id.to_string()),
            title: "Login broken".into(),
            description: "I cannot sign in".into(),
            user_name: "Carla".into(),
            user_email: "carla@example.com".into(),
            ..Default::default()
        },
    )
    .await
    .expect("seed ticket")
}

async fn post_json(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = routes(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get_json(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let response = routes(state.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
#[serial]
async fn widget_path_forces_client_attribution() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110000").await;

    // The caller lies about authorship; the path policy wins.
    let (status, body) = post_json(
        &state,
        "/widget/messages",
        json!({
            "ticketId": "TICKET-20260510-110000",
            "content": "Hello",
            "isClient": false,
            "userName": "Carla"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["duplicate"], false);

    let stored = MessageModel::find_all_for_ticket(state.db(), "TICKET-20260510-110000")
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_client);
}

#[tokio::test]
#[serial]
async fn agent_path_forces_agent_attribution() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110001").await;

    let (status, _) = post_json(
        &state,
        "/agent/messages",
        json!({
            "ticketId": "TICKET-20260510-110001",
            "content": "Hi there",
            "agentName": "Ana"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let stored = MessageModel::find_all_for_ticket(state.db(), "TICKET-20260510-110001")
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_client);
    assert_eq!(stored[0].user_name.as_deref(), Some("Ana"));
}

#[tokio::test]
#[serial]
async fn repeated_agent_message_is_a_flagged_no_op() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110002").await;

    let body = json!({
        "ticketId": "TICKET-20260510-110002",
        "content": "Same answer",
        "agentName": "Ana"
    });

    let (status, first) = post_json(&state, "/agent/messages", body.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["duplicate"], false);

    let (status, second) = post_json(&state, "/agent/messages", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["duplicate"], true);
    assert_eq!(second["data"]["messageId"], first["data"]["messageId"]);

    let stored = MessageModel::find_all_for_ticket(state.db(), "TICKET-20260510-110002")
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
#[serial]
async fn unknown_ticket_is_not_found_and_empty_content_is_rejected() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110003").await;

    let (status, _) = post_json(
        &state,
        "/widget/messages",
        json!({"ticketId": "TICKET-missing", "content": "Hello", "isClient": true}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &state,
        "/agent/messages",
        json!({"ticketId": "TICKET-20260510-110003", "content": "   "}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn create_ticket_honors_the_relayed_id_and_stores_the_first_message() {
    let state = test_state().await;

    let (status, body) = post_json(
        &state,
        "/tickets",
        json!({
            "id": "TICKET-20260510-110004",
            "title": "Widget question",
            "description": "How do I export my data?",
            "priority": "HIGH",
            "userName": "Carla",
            "userEmail": "carla@example.com",
            "isClient": true,
            "metadata": {"source": "widget", "widgetId": "w-42", "url": "https://shop.example"}
        }),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "TICKET-20260510-110004");
    assert_eq!(body["data"]["priority"], "high");

    let (status, messages) =
        get_json(&state, "/tickets/TICKET-20260510-110004/messages").await;
    assert_eq!(status, StatusCode::OK);
    let items = messages["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["content"], "How do I export my data?");
    assert_eq!(items[0]["isClient"], true);
}

#[tokio::test]
#[serial]
async fn ticket_detail_includes_ordered_history() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110005").await;

    for content in ["one", "two", "three"] {
        post_json(
            &state,
            "/widget/messages",
            json!({"ticketId": "TICKET-20260510-110005", "content": content, "isClient": true}),
        )
        .await;
    }

    let (status, body) = get_json(&state, "/tickets/TICKET-20260510-110005").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"]["messages"].as_array().unwrap();
    let contents: Vec<_> = items.iter().map(|m| m["content"].as_str().unwrap()).collect();
    assert_eq!(contents, vec!["one", "two", "three"]);

    let (status, _) = get_json(&state, "/tickets/TICKET-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[serial]
async fn api_key_guard_rejects_unauthenticated_calls() {
    let state = test_state().await;
    seed_ticket(state.db(), "TICKET-20260510-110006").await;

    AppConfig::set_api_key("sekrit");

    let (status, _) = get_json(&state, "/tickets/TICKET-20260510-110006").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = routes(state.clone())
        .oneshot(
            Request::builder()
                .uri("/tickets/TICKET-20260510-110006")
                .header(header::AUTHORIZATION, "Bearer sekrit")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Health stays reachable without a key.
    let (status, _) = get_json(&state, "/health").await;
    assert_eq!(status, StatusCode::OK);

    AppConfig::set_api_key("");
}
