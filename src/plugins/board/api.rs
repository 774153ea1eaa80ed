use super::errors::ApiError;
use super::types::{decode_tasks, Category, RawTask, Task, TaskDraft, TaskId, TaskPatch, TaskStatus};
use crate::core::settings::AppSettings;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// The task store's CRUD surface. Each call is a single attempt: no retries, no caching.
#[allow(async_fn_in_trait)]
pub trait BoardApi {
    /// Newest first. Tasks with a status outside the board's three are left out.
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ApiError>;
    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError>;
    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError>;
    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError>;
    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
}

/// [`BoardApi`] over JSON/HTTP.
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
}

impl HttpBoardApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self, ApiError> {
        Self::new(settings.api_base_url.clone(), settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends the request and maps transport failures and non-2xx statuses to errors.
    async fn send(&self, request: RequestBuilder, id: Option<TaskId>) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(target: "api", "Request failed: {}", e);
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            body
        };

        tracing::warn!(target: "api", status = status.as_u16(), %url, "Request rejected: {}", message);
        Err(ApiError::from_status(status.as_u16(), id, message))
    }

    /// Checks a single server record's status before it can reach the board.
    fn place(raw: RawTask) -> Result<Task, ApiError> {
        let id = raw.id;
        Task::try_from(raw).map_err(|source| {
            tracing::warn!(target: "api", task_id = id, "Excluding task from board: {}", source);
            ApiError::UnknownStatus { id, source }
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(target: "api", "Undecodable response: {}", e);
            ApiError::Decode(e.to_string())
        })
    }
}

impl BoardApi for HttpBoardApi {
    async fn list_tasks(&self, status: Option<TaskStatus>) -> Result<Vec<Task>, ApiError> {
        let mut request = self.client.get(self.url("tasks"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }

        let response = self.send(request, None).await?;
        let raw: Vec<RawTask> = Self::decode(response).await?;
        let (tasks, rejected) = decode_tasks(raw);

        tracing::debug!(
            target: "api",
            filter = status.map(TaskStatus::as_str),
            loaded = tasks.len(),
            rejected = rejected.len(),
            "Listed tasks"
        );
        Ok(tasks)
    }

    async fn get_task(&self, id: TaskId) -> Result<Task, ApiError> {
        let request = self.client.get(self.url(&format!("tasks/{}", id)));
        let response = self.send(request, Some(id)).await?;

        // A missing task comes back as `null` with a success status.
        let raw: Option<RawTask> = Self::decode(response).await?;
        Self::place(raw.ok_or(ApiError::NotFound(id))?)
    }

    async fn create_task(&self, draft: &TaskDraft) -> Result<Task, ApiError> {
        let request = self.client.post(self.url("tasks")).json(draft);
        let response = self.send(request, None).await?;
        let task = Self::place(Self::decode(response).await?)?;

        tracing::info!(target: "api", task_id = task.id, status = %task.status, "Created task");
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("tasks/{}", id)))
            .json(patch);
        let response = self.send(request, Some(id)).await?;
        let task = Self::place(Self::decode(response).await?)?;

        tracing::info!(target: "api", task_id = id, status = %task.status, "Updated task");
        Ok(task)
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("tasks/{}", id)));
        self.send(request, Some(id)).await?;

        tracing::info!(target: "api", task_id = id, "Deleted task");
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.client.get(self.url("categories"));
        let response = self.send(request, None).await?;
        Self::decode(response).await
    }
}
