use super::{AppError, AppResult};
use crate::domain::*;
use crate::ports::TodoRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    /// Set exactly while a fetch-all is in flight.
    pub is_loading: bool,
    /// Set when the most recent fetch-all failed.
    pub error: bool,
    pub last_synced: Option<DateTime<Utc>>,
}

impl TodoState {
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.status).count()
    }
}

/// Owns the todo collection and keeps it in step with the remote store.
///
/// Every operation is an independent future; nothing serializes them. The
/// state lock is only taken to fold a finished response in, never across a
/// network call, so concurrent operations interleave freely and the last
/// response to land wins.
pub struct TodoStore {
    repository: Arc<dyn TodoRepository>,
    state: RwLock<TodoState>,
}

impl TodoStore {
    pub fn new(repository: Arc<dyn TodoRepository>) -> Self {
        Self {
            repository,
            state: RwLock::new(TodoState::default()),
        }
    }

    pub async fn snapshot(&self) -> TodoState {
        self.state.read().await.clone()
    }

    /// Replaces the local collection with whatever the store holds.
    ///
    /// Failures keep the previous collection and raise the error flag, which
    /// stays up until the next fetch starts.
    pub async fn fetch_all(&self) -> AppResult<Vec<Todo>> {
        {
            let mut state = self.state.write().await;
            state.is_loading = true;
            state.error = false;
        }

        tracing::debug!("Fetching todo list");
        let result = self.repository.list_todos().await;

        let mut state = self.state.write().await;
        state.is_loading = false;
        match result {
            Ok(todos) => {
                tracing::info!("Loaded {} todos", todos.len());
                state.todos = todos.clone();
                state.last_synced = Some(Utc::now());
                Ok(todos)
            }
            Err(e) => {
                tracing::warn!("Failed to fetch todos: {}", e);
                state.error = true;
                Err(e.into())
            }
        }
    }

    /// Creates a todo, then re-fetches the list instead of inserting the new
    /// item locally.
    ///
    /// The reconciliation fetch reports through the error flag only; the id
    /// is returned as long as the create call succeeded.
    pub async fn add(&self, title: &str) -> AppResult<TodoId> {
        let title = TodoTitle::parse(title)?;

        let id = self.repository.create_todo(&title).await?;
        tracing::info!("Created todo {} ({})", id, title);

        if let Err(e) = self.fetch_all().await {
            tracing::warn!("Reconciliation fetch after creating {} failed: {}", id, e);
        }

        Ok(id)
    }

    /// Flips the stored status and returns the new value.
    pub async fn toggle(&self, id: &TodoId) -> AppResult<bool> {
        let todo = self
            .repository
            .get_todo(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.clone()))?;

        let status = !todo.status;
        self.repository.update_status(id, status).await?;
        tracing::info!("Set todo {} status to {}", id, status);

        let mut state = self.state.write().await;
        if let Some(local) = state.todos.iter_mut().find(|t| &t.id == id) {
            local.status = status;
        }

        Ok(status)
    }

    pub async fn delete(&self, id: &TodoId) -> AppResult<()> {
        self.repository.delete_todo(id).await?;
        tracing::info!("Deleted todo {}", id);

        self.state.write().await.todos.retain(|todo| &todo.id != id);
        Ok(())
    }
}
