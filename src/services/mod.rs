use thiserror::Error;

use crate::repository::RepositoryError;

pub mod products;

/// Result type returned by every service operation.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures surfaced to the API layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The addressed product does not exist.
    #[error("not found")]
    NotFound,
    /// The request payload failed validation; nothing was persisted.
    #[error("invalid payload: {0}")]
    Form(String),
    /// The request referenced a tag or category that does not exist; the
    /// transaction was rolled back.
    #[error("referential error: {0}")]
    Referential(String),
    /// The underlying store failed; the transaction was rolled back.
    #[error("repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::ReferentialIntegrity(message) => ServiceError::Referential(message),
            RepositoryError::ConstraintViolation(message) => ServiceError::Form(message),
            other => ServiceError::Repository(other),
        }
    }
}
