//! NGOConnect API surface
//!
//! `Api` bundles the secure client, the plain client used for unauthenticated
//! endpoints, and the auth context. Resource clients borrow from it:
//!
//! ```ignore
//! let api = Api::new(client, Duration::from_secs(30))?;
//! let campaigns = api.campaigns().list().await?;
//! ```

pub mod auth;
pub mod campaigns;
pub mod contact;
pub mod dashboard;
pub mod donations;
pub mod endpoints;
pub mod error;
pub mod events;
pub mod models;
pub mod notifications;
pub mod public;
pub mod tasks;
pub mod volunteers;

#[cfg(test)]
mod test_support;

use std::time::Duration;

use secure_client::{ApiRequest, SecureClient};
use serde::de::DeserializeOwned;

pub use auth::AuthContext;
pub use campaigns::Campaigns;
pub use contact::Contact;
pub use dashboard::Dashboard;
pub use donations::Donations;
pub use error::{Error, Result};
pub use events::Events;
pub use models::*;
pub use notifications::Notifications;
pub use public::PublicClient;
pub use tasks::Tasks;
pub use volunteers::Volunteers;

pub struct Api {
    client: SecureClient,
    public: PublicClient,
    auth: AuthContext,
}

impl Api {
    /// Build on an existing secure client. `timeout` applies to the plain client.
    pub fn new(client: SecureClient, timeout: Duration) -> Result<Self> {
        let public = PublicClient::new(client.base_url(), timeout)?;
        let auth = AuthContext::new(client.clone(), public.clone(), session::LOGIN_PATH);
        Ok(Self {
            client,
            public,
            auth,
        })
    }

    /// Override the login endpoint path.
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.auth = AuthContext::new(self.client.clone(), self.public.clone(), path);
        self
    }

    pub fn client(&self) -> &SecureClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthContext {
        &self.auth
    }

    pub fn campaigns(&self) -> Campaigns<'_> {
        Campaigns::new(&self.client)
    }

    pub fn donations(&self) -> Donations<'_> {
        Donations::new(&self.client, &self.public)
    }

    pub fn events(&self) -> Events<'_> {
        Events::new(&self.client)
    }

    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(&self.client)
    }

    pub fn volunteers(&self) -> Volunteers<'_> {
        Volunteers::new(&self.client)
    }

    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(&self.client)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(&self.client)
    }

    pub fn contact(&self) -> Contact<'_> {
        Contact::new(&self.public)
    }
}

/// Send a request whose response is a list, bare or paginated.
pub(crate) async fn fetch_list<T: DeserializeOwned>(
    client: &SecureClient,
    request: ApiRequest,
) -> Result<Vec<T>> {
    let response = client.send(request).await?;
    let envelope: ListEnvelope<T> = response.json()?;
    Ok(envelope.into_vec())
}
