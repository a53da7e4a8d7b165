use crate::ports::{RepositoryError, RepositoryResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin JSON-over-HTTP client for the document store.
pub struct DocumentStoreClient {
    client: Client,
    base_url: String,
}

impl DocumentStoreClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> RepositoryResult<Self> {
        let mut builder = Client::builder().user_agent("todo-tui/0.1.0");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Raw body of a successful GET, for callers that tolerate malformed JSON.
    pub async fn get_text(&self, path: &str) -> RepositoryResult<String> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        tracing::debug!("GET {} -> {}", path, response_text);
        Ok(response_text)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<T> {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, R: serde::Serialize>(
        &self,
        path: &str,
        body: &R,
    ) -> RepositoryResult<T> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await
    }

    /// PATCH whose response body is ignored.
    pub async fn patch<R: serde::Serialize>(&self, path: &str, body: &R) -> RepositoryResult<()> {
        let response = self
            .client
            .patch(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn delete(&self, path: &str) -> RepositoryResult<()> {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let response = Self::check_status(response).await?;
        let response_text = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        tracing::debug!("API Response: {}", response_text);

        serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Serialization(format!(
                "Failed to parse response: {e}. Response was: {response_text}"
            ))
        })
    }

    async fn check_status(response: Response) -> RepositoryResult<Response> {
        let status = response.status();

        match status.as_u16() {
            200..=299 => Ok(response),
            404 => Err(RepositoryError::NotFound(response.url().path().to_string())),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RepositoryError::Api(format!("HTTP {status}: {error_text}")))
            }
        }
    }
}
