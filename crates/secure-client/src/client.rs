//! The secure client and its response interceptor
//!
//! A 401 on a request that has not been retried goes through the refresh
//! gate. The leader calls the refresh endpoint on a plain client (no bearer,
//! no interceptor), so the refresh itself can never trigger another refresh.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use common::Secret;
use serde::Serialize;
use session::SessionStore;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::classify::{Disposition, classify_response};
use crate::error::{Error, Result};
use crate::gate::{Admission, Lease, RefreshGate};
use crate::metrics::{record_queued, record_refresh, record_request};
use crate::navigator::{LoginRedirect, Navigator};
use crate::request::{ApiRequest, ApiResponse, decode_body};

/// Default per-request timeout. Also bounds a hung refresh call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated API client.
///
/// Cheap to clone; clones share the session store, the refresh gate and the
/// default bearer, so there is one refresh cycle per process however many
/// handles exist.
#[derive(Clone)]
pub struct SecureClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    plain: reqwest::Client,
    base_url: String,
    refresh_url: String,
    timeout: Duration,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    gate: RefreshGate,
    default_bearer: RwLock<Option<Secret<String>>>,
}

/// Builder for [`SecureClient`].
pub struct SecureClientBuilder {
    base_url: String,
    store: Arc<SessionStore>,
    refresh_path: String,
    timeout: Duration,
    navigator: Option<Arc<dyn Navigator>>,
    http: Option<reqwest::Client>,
}

impl SecureClientBuilder {
    /// Path of the refresh endpoint, relative to the base URL.
    pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Use a preconfigured HTTP client for API requests.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<SecureClient> {
        if !is_absolute(&self.base_url) {
            return Err(Error::InvalidRequest(format!(
                "base URL must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        let base_url = self.base_url.trim_end_matches('/').to_string();
        let refresh_url = join_url(&base_url, &self.refresh_path);

        let plain = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| Error::InvalidRequest(format!("building refresh client: {e}")))?;
        let http = match self.http {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| Error::InvalidRequest(format!("building HTTP client: {e}")))?,
        };
        let navigator = self
            .navigator
            .unwrap_or_else(|| Arc::new(LoginRedirect::default()));

        info!(base_url = %base_url, refresh_url = %refresh_url, timeout_secs = self.timeout.as_secs(), "secure client ready");

        Ok(SecureClient {
            inner: Arc::new(Inner {
                http,
                plain,
                base_url,
                refresh_url,
                timeout: self.timeout,
                store: self.store,
                navigator,
                gate: RefreshGate::new(),
                default_bearer: RwLock::new(None),
            }),
        })
    }
}

impl SecureClient {
    pub fn builder(base_url: impl Into<String>, store: Arc<SessionStore>) -> SecureClientBuilder {
        SecureClientBuilder {
            base_url: base_url.into(),
            store,
            refresh_path: session::REFRESH_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            navigator: None,
            http: None,
        }
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// Send a request through both interceptors.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().simple());
        let span = info_span!(
            "api_request",
            request_id = %request_id,
            method = %request.method,
            path = %request.path,
        );
        self.execute(request).instrument(span).await
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.inner.store
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Refresh coordination state, for observability.
    pub fn gate(&self) -> &RefreshGate {
        &self.inner.gate
    }

    /// Absolute URL for an API path. Absolute http(s) URLs pass through.
    pub fn url_for(&self, path: &str) -> String {
        if is_absolute(path) {
            path.to_string()
        } else {
            join_url(&self.inner.base_url, path)
        }
    }

    /// Set or clear the client-wide default bearer.
    pub fn set_default_bearer(&self, token: Option<Secret<String>>) {
        match self.inner.default_bearer.write() {
            Ok(mut guard) => *guard = token,
            Err(poisoned) => *poisoned.into_inner() = token,
        }
    }

    fn default_bearer(&self) -> Option<Secret<String>> {
        match self.inner.default_bearer.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Response interceptor.
    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse> {
        let original = match self.dispatch(&request, None).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        let status = match &original {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        };
        let Some(status) = status else {
            return Err(original);
        };
        if classify_response(status, request.retried) == Disposition::PassThrough {
            return Err(original);
        }
        request.retried = true;

        match self.inner.gate.admit() {
            Admission::Wait(waiter) => {
                record_queued();
                debug!(ticket = waiter.ticket(), "401 while refresh in flight, queued");
                let release = waiter.wait().await?;
                debug!(position = release.position, "released after refresh, replaying");
                self.dispatch(&request, Some(&release.access_token)).await
            }
            Admission::Lead(lease) => self.refresh_and_replay(lease, &request, original).await,
        }
    }

    async fn refresh_and_replay(
        &self,
        lease: Lease<'_>,
        request: &ApiRequest,
        original: Error,
    ) -> Result<ApiResponse> {
        let Some(refresh) = self.inner.store.refresh_token().await else {
            warn!("401 with no refresh token stored, ending session");
            self.end_session().await;
            lease.fail(&session::Error::MissingRefreshToken);
            record_refresh("missing_token");
            return Err(original);
        };

        match session::refresh_access(&self.inner.plain, &self.inner.refresh_url, refresh.expose())
            .await
        {
            Ok(pair) => {
                if let Err(e) = self
                    .inner
                    .store
                    .store_tokens(&pair.access, pair.refresh.as_deref())
                    .await
                {
                    warn!(error = %e, "failed to persist refreshed tokens");
                }
                let rotated = pair.refresh.is_some();
                let access = Secret::new(pair.access);
                self.set_default_bearer(Some(access.clone()));
                let released = lease.succeed(&access);
                record_refresh("success");
                info!(released, rotated, "token refresh succeeded");
                self.dispatch(request, Some(&access)).await
            }
            Err(e) => {
                warn!(error = %e, "token refresh failed, ending session");
                // Clear before reopening the gate so nothing can start a new
                // cycle with the stale refresh token.
                self.end_session().await;
                let rejected = lease.fail(&e);
                record_refresh("failure");
                debug!(rejected, "queued requests rejected");
                Err(Error::Refresh(e))
            }
        }
    }

    async fn end_session(&self) {
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "failed to clear session store");
        }
        self.set_default_bearer(None);
        self.inner.navigator.redirect_to_login();
    }

    /// Request interceptor plus transport. Non-2xx becomes `Error::Status`.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        replay_token: Option<&Secret<String>>,
    ) -> Result<ApiResponse> {
        let url = self.url_for(&request.path);
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), &url)
            .timeout(request.options.timeout.unwrap_or(self.inner.timeout));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.bearer_for(replay_token).await {
            builder = builder.bearer_auth(token.expose());
        }

        let response = builder.send().await.map_err(|e| {
            record_request(None);
            transport_error(&url, &e)
        })?;
        let status = response.status();
        let headers = response.headers().clone();
        // Counted once the body is in; a truncated body is an error attempt.
        let raw = response.bytes().await.map_err(|e| {
            record_request(None);
            transport_error(&url, &e)
        })?;
        record_request(Some(status.as_u16()));

        if !status.is_success() {
            debug!(status = status.as_u16(), retried = request.retried, "request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&raw).into_owned(),
            });
        }

        Ok(ApiResponse {
            status,
            headers,
            body: decode_body(raw, request.options.response_type),
        })
    }

    /// Replay token, else the stored access token, else the default bearer.
    async fn bearer_for(&self, replay_token: Option<&Secret<String>>) -> Option<Secret<String>> {
        if let Some(token) = replay_token {
            return Some(token.clone());
        }
        if let Some(token) = self.inner.store.access_token().await {
            return Some(token);
        }
        self.default_bearer()
    }
}

fn transport_error(url: &str, e: &reqwest::Error) -> Error {
    Error::Transport {
        url: url.to_string(),
        message: e.to_string(),
        timeout: e.is_timeout(),
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
