pub mod handler_trait;
pub mod registry;
pub mod runtime;
pub mod serve;

pub use registry::ConnectionRegistry;

use common::envelope::Outbound;

/// Broadcast an outbound envelope to every connection registered for the
/// ticket.
pub async fn emit(registry: &ConnectionRegistry, ticket_id: &str, env: &Outbound) {
    if let Some(text) = env.to_text() {
        registry.broadcast(ticket_id, text).await;
    }
}
