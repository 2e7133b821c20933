//! Auth context: sign-in, sign-out and account management
//!
//! Sign-in exchanges credentials for a token pair on the plain client, stores
//! both tokens, then loads the profile through the secure client. From then
//! on every secure request carries the access token and expiry is handled by
//! the refresh gate.

use common::Secret;
use secure_client::SecureClient;
use session::Credentials;
use tracing::{info, warn};

use crate::endpoints;
use crate::error::{Error, Result};
use crate::models::{NewAccount, PasswordReset, Profile, ProfileUpdate};
use crate::public::PublicClient;

#[derive(Clone)]
pub struct AuthContext {
    client: SecureClient,
    public: PublicClient,
    login_path: String,
}

impl AuthContext {
    pub fn new(client: SecureClient, public: PublicClient, login_path: impl Into<String>) -> Self {
        Self {
            client,
            public,
            login_path: login_path.into(),
        }
    }

    /// Exchange credentials for tokens, persist them and return the profile.
    pub async fn sign_in(&self, email: &str, password: &Secret<String>) -> Result<Profile> {
        if email.trim().is_empty() || password.expose().is_empty() {
            return Err(Error::InvalidInput("email and password are required".into()));
        }

        let url = self.public.url_for(&self.login_path);
        let credentials = Credentials {
            email,
            password: password.expose(),
        };
        let pair = session::obtain_pair(self.public.http(), &url, &credentials)
            .await
            .map_err(login_error)?;
        if pair.refresh.is_none() {
            warn!("login response carried no refresh token; session cannot be renewed");
        }

        // A login replaces the whole session; no token of a previous
        // account may survive it.
        let store = self.client.store();
        store.clear().await?;
        self.client.set_default_bearer(None);
        store
            .store_tokens(&pair.access, pair.refresh.as_deref())
            .await?;
        info!(email, "signed in");

        self.profile().await
    }

    pub async fn register(&self, account: &NewAccount) -> Result<serde_json::Value> {
        let created = self.public.post(endpoints::AUTH_REGISTER, account).await?;
        info!(email = %account.email, "account registered");
        Ok(created)
    }

    /// Forget the session locally. There is no server-side logout.
    pub async fn sign_out(&self) -> Result<()> {
        self.client.store().clear().await?;
        self.client.set_default_bearer(None);
        info!("signed out");
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.client.store().access_token().await.is_some()
    }

    pub async fn profile(&self) -> Result<Profile> {
        let response = self.client.get(endpoints::AUTH_PROFILE).await?;
        Ok(response.json()?)
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile> {
        let response = self.client.patch(endpoints::AUTH_PROFILE, update).await?;
        Ok(response.json()?)
    }

    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        let _: serde_json::Value = self
            .public
            .post(
                endpoints::AUTH_FORGOT_PASSWORD,
                &serde_json::json!({ "email": email }),
            )
            .await?;
        Ok(())
    }

    pub async fn reset_password(&self, reset: &PasswordReset) -> Result<()> {
        if reset.new_password != reset.confirm_password {
            return Err(Error::InvalidInput("passwords do not match".into()));
        }
        let _: serde_json::Value = self
            .public
            .post(endpoints::AUTH_RESET_PASSWORD, reset)
            .await?;
        Ok(())
    }
}

/// A rejected login is an ordinary failed request, not a session fault.
fn login_error(e: session::Error) -> Error {
    match e {
        session::Error::Rejected { status, body } => {
            Error::Client(secure_client::Error::Status { status, body })
        }
        session::Error::Http(message) => Error::Client(secure_client::Error::Transport {
            url: String::new(),
            message,
            timeout: false,
        }),
        other => Error::Session(other),
    }
}
