//! Application state container shared across Axum route handlers.

use crate::notifier::Notifier;
use crate::ws::ConnectionRegistry;
use sea_orm::DatabaseConnection;

/// Central application state for a service.
///
/// Holds the service's own database connection, its connection registry, and
/// the notifier for the peer service. All three are built at the composition
/// root and passed by handle; none is ambient global state.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    registry: ConnectionRegistry,
    notifier: Notifier,
}

impl AppState {
    pub fn new(db: DatabaseConnection, registry: ConnectionRegistry, notifier: Notifier) -> Self {
        Self {
            db,
            registry,
            notifier,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Cloned database handle for spawned tasks that need ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Cloned registry handle for spawned tasks that need ownership.
    pub fn registry_clone(&self) -> ConnectionRegistry {
        self.registry.clone()
    }

    /// Cloned notifier handle for spawned tasks that need ownership.
    pub fn notifier_clone(&self) -> Notifier {
        self.notifier.clone()
    }
}
