use common::envelope::WireMessage;
use db::models::tickets::Model as TicketModel;
use serde::Serialize;

/// Ticket detail with its ordered message history.
#[derive(Serialize)]
pub struct TicketResponse {
    #[serde(flatten)]
    pub ticket: TicketModel,
    pub messages: Vec<WireMessage>,
}
