//! Dashboard summary figures

use secure_client::SecureClient;

use crate::endpoints;
use crate::error::Result;
use crate::models::DashboardSummary;

pub struct Dashboard<'a> {
    client: &'a SecureClient,
}

impl<'a> Dashboard<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        let response = self.client.get(endpoints::DASHBOARD_SUMMARY).await?;
        Ok(response.json()?)
    }
}
