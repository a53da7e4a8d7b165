use super::{parse_todo_list, CreatedDto, DocumentStoreClient, StatusPatchDto, TodoDto};
use crate::{
    domain::{Todo, TodoId, TodoTitle},
    ports::{RepositoryResult, TodoRepository},
};
use async_trait::async_trait;

const COLLECTION_PATH: &str = "/todos.json";

pub struct RemoteTodoRepository {
    client: DocumentStoreClient,
}

impl RemoteTodoRepository {
    pub fn new(client: DocumentStoreClient) -> Self {
        Self { client }
    }

    fn item_path(id: &TodoId) -> String {
        format!("/todos/{}.json", urlencoding::encode(&id.0))
    }
}

#[async_trait]
impl TodoRepository for RemoteTodoRepository {
    async fn list_todos(&self) -> RepositoryResult<Vec<Todo>> {
        let body = self.client.get_text(COLLECTION_PATH).await?;
        Ok(parse_todo_list(&body))
    }

    async fn create_todo(&self, title: &TodoTitle) -> RepositoryResult<TodoId> {
        let created: CreatedDto = self
            .client
            .post(COLLECTION_PATH, &TodoDto::from(title))
            .await?;
        Ok(TodoId(created.name))
    }

    async fn get_todo(&self, id: &TodoId) -> RepositoryResult<Option<Todo>> {
        let dto: Option<TodoDto> = self.client.get(&Self::item_path(id)).await?;
        Ok(dto.map(|dto| dto.into_todo(id.clone())))
    }

    async fn update_status(&self, id: &TodoId, status: bool) -> RepositoryResult<()> {
        self.client
            .patch(&Self::item_path(id), &StatusPatchDto { status })
            .await
    }

    async fn delete_todo(&self, id: &TodoId) -> RepositoryResult<()> {
        self.client.delete(&Self::item_path(id)).await
    }
}
