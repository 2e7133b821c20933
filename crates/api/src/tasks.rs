//! Volunteer tasks

use secure_client::{ApiRequest, SecureClient};
use tracing::info;

use crate::endpoints::{TASKS, detail};
use crate::error::Result;
use crate::fetch_list;
use crate::models::{Task, TaskInput};

pub struct Tasks<'a> {
    client: &'a SecureClient,
}

impl<'a> Tasks<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        fetch_list(self.client, ApiRequest::get(TASKS)).await
    }

    /// Tasks assigned to the signed-in volunteer.
    pub async fn list_mine(&self) -> Result<Vec<Task>> {
        fetch_list(self.client, ApiRequest::get(TASKS).query("mine", true)).await
    }

    pub async fn create(&self, input: &TaskInput) -> Result<Task> {
        let response = self.client.post(TASKS, input).await?;
        Ok(response.json()?)
    }

    /// Full replacement of a task.
    pub async fn update(&self, id: u64, input: &TaskInput) -> Result<Task> {
        let response = self.client.put(&detail(TASKS, id, None), input).await?;
        Ok(response.json()?)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&detail(TASKS, id, None)).await?;
        info!(id, "task deleted");
        Ok(())
    }

    pub async fn complete(&self, id: u64) -> Result<()> {
        self.client
            .send(ApiRequest::patch(detail(TASKS, id, Some("complete"))))
            .await?;
        info!(id, "task completed");
        Ok(())
    }
}
