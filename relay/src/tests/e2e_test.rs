//! Two-service convergence: real HTTP between a relay and a backend, each
//! with its own store, reconciled only by the notifier.

use std::time::Duration;

use axum::Router;
use sea_orm::DbConn;
use serde_json::{Value, json};
use serial_test::serial;
use util::notifier::Notifier;
use util::state::AppState;
use util::ws::ConnectionRegistry;

use db::models::messages::Model as MessageModel;

async fn spawn_app(app: Router, port: u16) {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .expect("bind service port");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
}

/// Polls until the ticket's history on `db` reaches `expected` messages.
async fn wait_for_messages(db: &DbConn, ticket_id: &str, expected: usize) -> Vec<MessageModel> {
    for _ in 0..100 {
        if let Ok(messages) = MessageModel::find_all_for_ticket(db, ticket_id).await {
            if messages.len() >= expected {
                return messages;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("ticket {ticket_id} never reached {expected} messages");
}

#[tokio::test]
#[serial]
async fn visitor_and_agent_messages_converge_across_both_stores() {
    let relay_db = db::test_utils::setup_test_db().await;
    let backend_db = db::test_utils::setup_test_db().await;

    let relay_port = portpicker::pick_unused_port().expect("no free port");
    let backend_port = portpicker::pick_unused_port().expect("no free port");

    let relay_state = AppState::new(
        relay_db.clone(),
        ConnectionRegistry::new(),
        Notifier::new(format!("http://127.0.0.1:{backend_port}"), "", Vec::new()),
    );
    let backend_state = AppState::new(
        backend_db.clone(),
        ConnectionRegistry::new(),
        Notifier::new(format!("http://127.0.0.1:{relay_port}"), "", Vec::new()),
    );

    spawn_app(crate::routes::routes(relay_state), relay_port).await;
    spawn_app(
        Router::new().nest("/api", api::routes::routes(backend_state)),
        backend_port,
    )
    .await;

    let client = reqwest::Client::new();
    let relay_url = format!("http://127.0.0.1:{relay_port}");
    let backend_url = format!("http://127.0.0.1:{backend_port}");

    // A visitor opens a ticket through the widget.
    let resp = client
        .post(format!("{relay_url}/widget/tickets"))
        .json(&json!({
            "subject": "Order stuck",
            "message": "Hello",
            "name": "Carla",
            "email": "carla@example.com"
        }))
        .send()
        .await
        .expect("create ticket");
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    let ticket_id = body["data"]["ticketId"].as_str().unwrap().to_string();

    // Both stores end up with the same ticket and its opening message.
    let relay_msgs = wait_for_messages(&relay_db, &ticket_id, 1).await;
    assert!(relay_msgs[0].is_client);
    assert_eq!(relay_msgs[0].content, "Hello");

    let backend_msgs = wait_for_messages(&backend_db, &ticket_id, 1).await;
    assert!(backend_msgs[0].is_client);
    assert_eq!(backend_msgs[0].content, "Hello");

    // A follow-up visitor message flows relay → backend; the backend's echo
    // back to the relay is absorbed by the duplicate window.
    let resp = client
        .post(format!("{relay_url}/widget/messages"))
        .json(&json!({"ticketId": ticket_id, "message": "Any update?"}))
        .send()
        .await
        .expect("send visitor message");
    assert_eq!(resp.status(), 200);

    let backend_msgs = wait_for_messages(&backend_db, &ticket_id, 2).await;
    assert!(backend_msgs.iter().all(|m| m.is_client));

    // An agent replies on the backend; the relay converges.
    let resp = client
        .post(format!("{backend_url}/api/agent/messages"))
        .json(&json!({"ticketId": ticket_id, "content": "Hi there", "agentName": "Ana"}))
        .send()
        .await
        .expect("send agent message");
    assert_eq!(resp.status(), 200);

    let backend_msgs = wait_for_messages(&backend_db, &ticket_id, 3).await;
    assert_eq!(backend_msgs.last().unwrap().content, "Hi there");
    assert!(!backend_msgs.last().unwrap().is_client);

    let relay_msgs = wait_for_messages(&relay_db, &ticket_id, 3).await;
    let reply = relay_msgs.last().unwrap();
    assert_eq!(reply.content, "Hi there");
    assert!(!reply.is_client);
    assert_eq!(reply.user_name.as_deref(), Some("Ana"));

    // The echo never produced extra copies on the relay.
    assert_eq!(relay_msgs.len(), 3);
    assert!(relay_msgs[0].is_client && relay_msgs[1].is_client);
}
