pub mod poll_repository;
pub mod user_repository;

pub use poll_repository::{PollRepository, SqlitePollRepository};
pub use user_repository::{SqliteUserRepository, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found")]
    NotFound,
    #[error("Already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// SQLite reports constraint violations in the error text. The UNIQUE
/// constraints we rely on (users.email, votes user/poll pair) both surface
/// this way on insert.
pub(crate) fn map_unique_violation(err: sqlx::Error) -> RepositoryError {
    if err.to_string().contains("UNIQUE") {
        RepositoryError::AlreadyExists
    } else {
        RepositoryError::Database(err)
    }
}
