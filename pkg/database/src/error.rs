use thiserror::Error;
use tokio_postgres::error::SqlState;

/// Database error shared by every repository.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DBError {
    #[error("unknown error occured")]
    Unknown,

    #[error("internal database error: {0}")]
    Internal(tokio_postgres::Error),

    #[error("connection error: {0}")]
    Connection(#[from] deadpool_postgres::PoolError),

    #[error("entity not found")]
    NotFound,

    #[error("entity already exists")]
    AlreadyExists,
}

impl From<tokio_postgres::Error> for DBError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
            return Self::AlreadyExists;
        }
        Self::Internal(err)
    }
}
