//! Volunteer events and sign-ups

use secure_client::{ApiRequest, SecureClient};
use serde::Serialize;
use tracing::info;

use crate::endpoints::{EVENTS, detail};
use crate::error::Result;
use crate::fetch_list;
use crate::models::{Event, EventInput};

pub struct Events<'a> {
    client: &'a SecureClient,
}

impl<'a> Events<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        fetch_list(self.client, ApiRequest::get(EVENTS)).await
    }

    pub async fn create(&self, input: &EventInput) -> Result<Event> {
        let response = self.client.post(EVENTS, input).await?;
        Ok(response.json()?)
    }

    /// Partial update; send only the fields that change.
    pub async fn update<B: Serialize + ?Sized>(&self, id: u64, patch: &B) -> Result<Event> {
        let response = self.client.patch(&detail(EVENTS, id, None), patch).await?;
        Ok(response.json()?)
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(&detail(EVENTS, id, None)).await?;
        info!(id, "event deleted");
        Ok(())
    }

    pub async fn sign_up(&self, id: u64) -> Result<()> {
        self.client
            .send(ApiRequest::post(detail(EVENTS, id, Some("signup"))))
            .await?;
        info!(id, "signed up for event");
        Ok(())
    }

    pub async fn cancel_sign_up(&self, id: u64) -> Result<()> {
        self.client
            .delete(&detail(EVENTS, id, Some("signup")))
            .await?;
        info!(id, "event sign-up cancelled");
        Ok(())
    }
}
