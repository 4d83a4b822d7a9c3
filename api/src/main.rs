use api::routes::routes;
use api::ws::ws_routes;
use axum::Router;
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use util::notifier::Notifier;
use util::ws::ConnectionRegistry;
use util::{config, logging::init_logging, state::AppState};

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    // Set up dependencies
    let db = db::connect().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let registry = ConnectionRegistry::new();
    let notifier = Notifier::new(config::widget_api_url(), config::api_key(), relay_aliases());
    let app_state = AppState::new(db, registry, notifier);

    // Configure middleware
    let cors = CorsLayer::very_permissive();

    // Build app router
    let app = Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state.clone()))
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    println!(
        "Starting {} backend on http://{}:{}",
        config::project_name(),
        config::host(),
        config::port()
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app,
    )
    .await
    .expect("Server crashed");
}

/// Candidate-host substitutions for reaching the widget relay: the loopback
/// name used in development and the compose service alias, plus the relay's
/// alternate port.
fn relay_aliases() -> Vec<(String, String)> {
    vec![
        ("localhost".into(), "helpdesk-widget".into()),
        (":3000".into(), ":3001".into()),
    ]
}
