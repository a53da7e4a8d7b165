use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("The task cannot be empty!")]
    EmptyTitle,
}

pub type DomainResult<T> = Result<T, DomainError>;
