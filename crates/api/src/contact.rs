//! Public contact form

use tracing::info;

use crate::endpoints;
use crate::error::{Error, Result};
use crate::models::ContactMessage;
use crate::public::PublicClient;

pub struct Contact<'a> {
    public: &'a PublicClient,
}

impl<'a> Contact<'a> {
    pub fn new(public: &'a PublicClient) -> Self {
        Self { public }
    }

    pub async fn send(&self, message: &ContactMessage) -> Result<()> {
        if message.message.trim().is_empty() {
            return Err(Error::InvalidInput("message is empty".into()));
        }
        let _: serde_json::Value = self.public.post(endpoints::CONTACT, message).await?;
        info!("contact message sent");
        Ok(())
    }
}
