pub mod entry_repository;
pub mod user_repository;

pub use entry_repository::{EntryRepository, SqliteEntryRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Maps a write failure, turning UNIQUE violations into `AlreadyExists`.
pub(crate) fn map_write_error(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => RepositoryError::AlreadyExists,
        other => RepositoryError::Database(other),
    }
}
