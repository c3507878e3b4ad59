use zawadi_core::error::CoreError;

/// Error type for the ledger, intake and reconciler services.
///
/// Domain failures ride in [`CoreError`]; raw database errors are kept
/// separate so the HTTP layer can classify constraint violations
/// (e.g. the duplicate-feedback unique index racing past the pre-check)
/// into proper 409 responses.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
