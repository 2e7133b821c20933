//! Unauthenticated calls
//!
//! Login, registration, password recovery, guest donations and the contact
//! form go out without a bearer and bypass the refresh machinery: a 401 from
//! one of these endpoints is just a failure.

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Error, Result};

/// Plain HTTP client rooted at the API base URL.
#[derive(Clone)]
pub struct PublicClient {
    http: reqwest::Client,
    base_url: String,
}

impl PublicClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidInput(format!("building public client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url_for(path);
        debug!(url = %url, "public GET");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, &e))?;
        read_json(&url, response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url_for(path);
        debug!(url = %url, "public POST");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport(&url, &e))?;
        read_json(&url, response).await
    }
}

fn transport(url: &str, e: &reqwest::Error) -> Error {
    Error::Client(secure_client::Error::Transport {
        url: url.to_string(),
        message: e.to_string(),
        timeout: e.is_timeout(),
    })
}

/// Non-2xx becomes a status error; an empty 2xx body reads as `null`.
async fn read_json<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(|e| transport(url, &e))?;
    if !status.is_success() {
        return Err(Error::Client(secure_client::Error::Status {
            status: status.as_u16(),
            body: text,
        }));
    }
    let value = if text.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(&text).map_err(|e| secure_client::Error::Decode(e.to_string()))?
    };
    serde_json::from_value(value)
        .map_err(|e| Error::Client(secure_client::Error::Decode(e.to_string())))
}
