use crate::domain::{DomainError, TodoId};
use crate::ports::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Todo not found: {0}")]
    NotFound(TodoId),
}

pub type AppResult<T> = Result<T, AppError>;
