use sea_orm::DbErr;
use thiserror::Error;

/// Store-level failure taxonomy.
///
/// `TicketNotFound` is surfaced to HTTP callers as a 404; `Db` as a 500.
/// Neither is ever fatal to the process.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ticket not found: {0}")]
    TicketNotFound(String),

    #[error("database error: {0}")]
    Db(#[from] DbErr),
}
