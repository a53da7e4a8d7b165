use crate::domain::{Todo, TodoId, TodoTitle};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The remote document store holding the single todo collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoRepository: Send + Sync {
    /// All items, in the order the store returned them.
    async fn list_todos(&self) -> RepositoryResult<Vec<Todo>>;
    /// Creates an incomplete item and returns the id the store assigned.
    async fn create_todo(&self, title: &TodoTitle) -> RepositoryResult<TodoId>;
    /// `Ok(None)` when the store has no item under `id`.
    async fn get_todo(&self, id: &TodoId) -> RepositoryResult<Option<Todo>>;
    async fn update_status(&self, id: &TodoId, status: bool) -> RepositoryResult<()>;
    async fn delete_todo(&self, id: &TodoId) -> RepositoryResult<()>;
}
