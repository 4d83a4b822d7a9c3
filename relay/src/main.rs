use axum::Router;
use migration::Migrator;
use relay::routes::routes;
use relay::ws::ws_routes;
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
    let notifier = Notifier::new(config::backend_api_url(), config::api_key(), backend_aliases());
    let app_state = AppState::new(db, registry, notifier);

    // The widget is embedded in arbitrary customer sites.
    let cors = CorsLayer::very_permissive();

    // Build app router
    let app = Router::new()
        .merge(routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state.clone()))
        .layer(cors);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    println!(
        "Starting {} widget relay on http://{}:{}",
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

/// Candidate-host substitutions for reaching the backend: the loopback name
/// used in development and the compose service alias, plus the backend's
/// alternate port.
fn backend_aliases() -> Vec<(String, String)> {
    vec![
        ("localhost".into(), "helpdesk-backend".into()),
        (":8080".into(), ":8081".into()),
    ]
}
