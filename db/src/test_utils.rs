use migration::Migrator;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_DB: AtomicUsize = AtomicUsize::new(0);

/// Fresh migrated in-memory database.
///
/// Each call gets its own named shared-cache database, held open by a
/// single-connection pool: every caller sees the same schema and data, and
/// writes serialize without shared-cache lock errors.
pub async fn setup_test_db() -> DatabaseConnection {
    let id = NEXT_DB.fetch_add(1, Ordering::Relaxed);
    let url = format!("sqlite:file:helpdesk_test_{id}?mode=memory&cache=shared");

    let mut options = ConnectOptions::new(url);
    options.max_connections(1).min_connections(1);

    let db = Database::connect(options)
        .await
        .expect("Failed to connect to in-memory db");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
