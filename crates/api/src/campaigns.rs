//! Campaign listing

use secure_client::{ApiRequest, SecureClient};

use crate::endpoints;
use crate::error::Result;
use crate::fetch_list;
use crate::models::Campaign;

pub struct Campaigns<'a> {
    client: &'a SecureClient,
}

impl<'a> Campaigns<'a> {
    pub fn new(client: &'a SecureClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Campaign>> {
        fetch_list(self.client, ApiRequest::get(endpoints::CAMPAIGNS)).await
    }

    pub async fn get(&self, id: u64) -> Result<Campaign> {
        let response = self
            .client
            .get(&endpoints::detail(endpoints::CAMPAIGNS, id, None))
            .await?;
        Ok(response.json()?)
    }
}
