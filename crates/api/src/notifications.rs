//! In-app notifications

use secure_client::{ApiRequest, SecureClient};
use tracing::debug;

use crate::endpoints::{NOTIFICATIONS, NOTIFICATIONS_MARK_ALL_READ, detail};
use crate::error::Result;
use crate::fetch_list;
use crate::models::Notification;

pub struct Notifications<'a> {
    client: &'a SecureClient,
}

impl<'a> Notifications<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Notification>> {
        fetch_list(self.client, ApiRequest::get(NOTIFICATIONS)).await
    }

    /// Unread notifications, counted client-side from the list.
    pub async fn unread_count(&self) -> Result<usize> {
        let unread = self.list().await?.iter().filter(|n| !n.is_read).count();
        debug!(unread, "counted unread notifications");
        Ok(unread)
    }

    pub async fn mark_read(&self, id: u64) -> Result<()> {
        self.client
            .send(ApiRequest::patch(detail(NOTIFICATIONS, id, Some("read"))))
            .await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.client
            .send(ApiRequest::post(NOTIFICATIONS_MARK_ALL_READ))
            .await?;
        Ok(())
    }
}
