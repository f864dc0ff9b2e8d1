use thiserror::Error;

use crate::domain::types::TypeConstraintError;
use crate::gateway::GatewayError;
use crate::repository::errors::RepositoryError;

pub mod auth;
pub mod client;
pub mod invoice;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Form error: {0}")]
    Form(String),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
