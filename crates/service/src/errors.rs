use models::ModelError;
use sea_orm::{sqlx, DbErr, RuntimeErr};
use thiserror::Error;

use crate::storage::StoreError;

/// Outcome classes every operation maps into; the HTTP layer turns each
/// variant into exactly one status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Connection(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(resource: &str, key: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{resource} with id '{key}' was not found."))
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(m) => ServiceError::Validation(m),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection(m) => ServiceError::Connection(m),
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        let lost = match &e {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
            DbErr::Query(RuntimeErr::SqlxError(inner)) | DbErr::Exec(RuntimeErr::SqlxError(inner)) => {
                is_link_failure(inner)
            }
            _ => false,
        };
        if lost {
            ServiceError::Connection(e.to_string())
        } else {
            ServiceError::Internal(e.to_string())
        }
    }
}

/// Driver errors meaning the store went away mid-statement.
fn is_link_failure(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}
