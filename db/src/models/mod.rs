pub mod messages;
pub mod tickets;
