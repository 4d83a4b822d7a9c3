pub mod m202605100001_create_tickets;
pub mod m202605100002_create_messages;
