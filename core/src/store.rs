//! The four remote operations the list view depends on.
//!
//! # Design
//! `TaskStore` is the seam between the controller and the network. The
//! production `RemoteStore` composes a `TableClient` with a `Transport`:
//! build, execute, parse, one round trip per call, never retried.

use async_trait::async_trait;

use crate::client::TableClient;
use crate::config::StoreConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{NewTask, Task, TaskId};

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Every task, newest first.
    async fn fetch_all(&self) -> Result<Vec<Task>, ApiError>;

    /// Insert one task. The created row is not returned; refetch to see it.
    async fn create(&self, task: NewTask) -> Result<(), ApiError>;

    /// Set `completed` on the row with `id`.
    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), ApiError>;

    /// Remove the row with `id`.
    async fn delete(&self, id: &TaskId) -> Result<(), ApiError>;
}

/// `TaskStore` talking to the hosted table over HTTP.
#[derive(Debug, Clone)]
pub struct RemoteStore<T = ReqwestTransport> {
    client: TableClient,
    transport: T,
}

impl RemoteStore<ReqwestTransport> {
    pub fn connect(config: &StoreConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> RemoteStore<T> {
    pub fn with_transport(config: &StoreConfig, transport: T) -> Self {
        Self {
            client: TableClient::new(config),
            transport,
        }
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        tracing::trace!(method = request.method.as_str(), url = %request.url, "sending");
        self.transport.execute(request).await
    }
}

#[async_trait]
impl<T: Transport> TaskStore for RemoteStore<T> {
    async fn fetch_all(&self) -> Result<Vec<Task>, ApiError> {
        let tasks = self
            .round_trip(self.client.build_list_tasks())
            .await
            .and_then(|r| self.client.parse_list_tasks(r))
            .inspect_err(|e| tracing::warn!("fetching tasks failed: {e}"))?;
        tracing::debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    async fn create(&self, task: NewTask) -> Result<(), ApiError> {
        let request = self.client.build_create_task(&task)?;
        self.round_trip(request)
            .await
            .and_then(|r| self.client.parse_create_task(r))
            .inspect_err(|e| tracing::warn!("creating task failed: {e}"))?;
        tracing::debug!(text = task.text(), "created task");
        Ok(())
    }

    async fn set_completed(&self, id: &TaskId, completed: bool) -> Result<(), ApiError> {
        let request = self.client.build_set_completed(id, completed)?;
        self.round_trip(request)
            .await
            .and_then(|r| self.client.parse_set_completed(r))
            .inspect_err(|e| tracing::warn!(%id, "updating task failed: {e}"))?;
        tracing::debug!(%id, completed, "updated task");
        Ok(())
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        self.round_trip(self.client.build_delete_task(id))
            .await
            .and_then(|r| self.client.parse_delete_task(r))
            .inspect_err(|e| tracing::warn!(%id, "deleting task failed: {e}"))?;
        tracing::debug!(%id, "deleted task");
        Ok(())
    }
}
