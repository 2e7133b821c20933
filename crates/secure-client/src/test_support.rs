//! Mock API server for client tests
//!
//! Protected routes accept only `Bearer <valid_token>` and answer 401
//! otherwise. The refresh route can be held open until the test releases it,
//! which makes "arrives while refresh is in flight" deterministic.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::navigator::Navigator;

pub(crate) struct MockState {
    pub valid_token: String,
    pub refresh_calls: AtomicUsize,
    pub refresh_tokens_seen: Mutex<Vec<String>>,
    pub refresh_response: Mutex<(StatusCode, serde_json::Value)>,
    pub hold_refresh: AtomicBool,
    pub release_refresh: Notify,
    pub authorizations_seen: Mutex<Vec<Option<String>>>,
}

impl MockState {
    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Authorization header of the most recent protected/public request.
    pub fn last_authorization(&self) -> Option<String> {
        self.authorizations_seen
            .lock()
            .unwrap()
            .last()
            .cloned()
            .flatten()
    }
}

pub(crate) struct MockApi {
    pub url: String,
    pub state: Arc<MockState>,
}

impl MockApi {
    /// Start a server that accepts `valid_token` and answers refreshes with
    /// `refresh_status` + `refresh_body`.
    pub async fn start(
        valid_token: &str,
        refresh_status: StatusCode,
        refresh_body: serde_json::Value,
    ) -> Self {
        let state = Arc::new(MockState {
            valid_token: valid_token.to_string(),
            refresh_calls: AtomicUsize::new(0),
            refresh_tokens_seen: Mutex::new(Vec::new()),
            refresh_response: Mutex::new((refresh_status, refresh_body)),
            hold_refresh: AtomicBool::new(false),
            release_refresh: Notify::new(),
            authorizations_seen: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/token/refresh/", post(refresh))
            .route("/api/items/{id}", any(protected_item))
            .route("/api/always-401/", get(always_unauthorized))
            .route("/api/broken/", get(broken))
            .route("/api/public/", get(public))
            .route("/api/echo/", post(echo))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Keep refresh calls open until `release_refresh()` is called.
    pub fn hold_refresh(&self) {
        self.state.hold_refresh.store(true, Ordering::SeqCst);
    }

    pub fn release_refresh(&self) {
        self.state.release_refresh.notify_one();
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({"detail": "Given token not valid for any token type"})),
    )
}

async fn refresh(
    State(state): State<Arc<MockState>>,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if let Some(token) = body["refresh"].as_str() {
        state
            .refresh_tokens_seen
            .lock()
            .unwrap()
            .push(token.to_string());
    }
    if state.hold_refresh.load(Ordering::SeqCst) {
        state.release_refresh.notified().await;
    }
    let (status, body) = state.refresh_response.lock().unwrap().clone();
    (status, Json(body))
}

async fn protected_item(
    State(state): State<Arc<MockState>>,
    Path(id): Path<u32>,
    headers: HeaderMap,
) -> (StatusCode, Json<serde_json::Value>) {
    let auth = authorization(&headers);
    state.authorizations_seen.lock().unwrap().push(auth.clone());
    let expected = format!("Bearer {}", state.valid_token);
    if auth.as_deref() == Some(expected.as_str()) {
        (
            StatusCode::OK,
            Json(serde_json::json!({"id": id, "authorization": auth})),
        )
    } else {
        unauthorized()
    }
}

async fn always_unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    unauthorized()
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
}

async fn public(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    let auth = authorization(&headers);
    state.authorizations_seen.lock().unwrap().push(auth.clone());
    Json(serde_json::json!({"authorization": auth}))
}

async fn echo(
    Query(query): Query<std::collections::HashMap<String, String>>,
    Json(body): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({"query": query, "body": body}))
}

/// Navigator that counts redirects.
#[derive(Default)]
pub(crate) struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

/// Navigator that parks the redirecting thread until `release`, so a test can
/// queue requests while the session is being ended. Needs a multi-thread
/// runtime.
#[derive(Default)]
pub(crate) struct HeldNavigator {
    redirects: AtomicUsize,
    released: Mutex<bool>,
    wake: Condvar,
}

impl HeldNavigator {
    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        *self.released.lock().unwrap() = true;
        self.wake.notify_all();
    }
}

impl Navigator for HeldNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        // Hand this worker's queued tasks to another thread while parked.
        tokio::task::block_in_place(|| {
            let mut released = self.released.lock().unwrap();
            while !*released {
                released = self.wake.wait(released).unwrap();
            }
        });
    }
}
