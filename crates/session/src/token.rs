//! Token endpoint calls
//!
//! Two unauthenticated interactions with the API:
//! 1. Login: email + password exchanged for an access/refresh pair
//! 2. Refresh: a refresh token exchanged for a new access token (and possibly
//!    a rotated refresh token)
//!
//! Both go through a plain `reqwest::Client` with no bearer header attached,
//! so a refresh can never recurse into the secure client's 401 handling.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Response body from the login and refresh endpoints.
///
/// `refresh` is optional: a refresh response without rotation only carries
/// `access`, and the stored refresh token must be kept.
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Login form payload.
#[derive(Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

/// Exchange a refresh token for a new access token.
///
/// Any non-2xx status is a failed refresh; the caller decides what that means
/// for the session.
pub async fn refresh_access(
    client: &reqwest::Client,
    url: &str,
    refresh: &str,
) -> Result<TokenPair> {
    debug!(url, "requesting token refresh");
    let response = client
        .post(url)
        .json(&RefreshRequest { refresh })
        .send()
        .await
        .map_err(|e| Error::Http(format!("token refresh request failed: {e}")))?;

    read_pair(response).await
}

/// Exchange login credentials for a token pair.
pub async fn obtain_pair(
    client: &reqwest::Client,
    url: &str,
    credentials: &Credentials<'_>,
) -> Result<TokenPair> {
    debug!(url, email = credentials.email, "requesting token pair");
    let response = client
        .post(url)
        .json(credentials)
        .send()
        .await
        .map_err(|e| Error::Http(format!("login request failed: {e}")))?;

    read_pair(response).await
}

async fn read_pair(response: reqwest::Response) -> Result<TokenPair> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Rejected {
            status: status.as_u16(),
            body,
        });
    }

    let pair = response
        .json::<TokenPair>()
        .await
        .map_err(|e| Error::InvalidResponse(e.to_string()))?;

    if pair.access.is_empty() {
        return Err(Error::InvalidResponse("empty access token".into()));
    }
    Ok(pair)
}
