//! Database error types.

use tabletalk_common::TableTalkError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[cfg(feature = "postgres")]
    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
}

impl DbError {
    /// True when the caller sent something the store refuses to accept.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::NotFound(_))
    }
}

impl From<TableTalkError> for DbError {
    fn from(err: TableTalkError) -> Self {
        match err {
            TableTalkError::Validation(msg) => DbError::Validation(msg),
            TableTalkError::NotFound(msg) => DbError::NotFound(msg),
            TableTalkError::Serialization(e) => DbError::Serialization(e),
            other => DbError::Storage(other.to_string()),
        }
    }
}
