//! Recording mock backend for resource client tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use secure_client::{LoginRedirect, SecureClient};
use session::SessionStore;
use tokio::net::TcpListener;

use crate::Api;

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<serde_json::Value>,
}

#[derive(Default)]
struct BackendState {
    routes: Mutex<HashMap<String, (StatusCode, serde_json::Value)>>,
    requests: Mutex<Vec<Recorded>>,
}

/// Answers configured `METHOD path` pairs; everything else is a DRF-style 404.
pub(crate) struct MockBackend {
    pub url: String,
    state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

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

    /// Configure the response for a route. A `Null` body is sent empty.
    pub fn respond(&self, method: &str, path: &str, status: StatusCode, body: serde_json::Value) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(format!("{method} {path}"), (status, body));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no requests recorded")
    }

    pub fn count(&self, method: &str, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&body).ok(),
    };
    let key = format!("{} {}", recorded.method, recorded.path);
    state.requests.lock().unwrap().push(recorded);

    let route = state.routes.lock().unwrap().get(&key).cloned();
    match route {
        Some((status, serde_json::Value::Null)) => status.into_response(),
        Some((status, body)) => (status, Json(body)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"detail": "Not found."})),
        )
            .into_response(),
    }
}

pub(crate) fn api_for(backend: &MockBackend, store: Arc<SessionStore>) -> Api {
    let client = SecureClient::builder(&backend.url, store)
        .timeout(Duration::from_secs(5))
        .navigator(Arc::new(LoginRedirect::default()))
        .build()
        .unwrap();
    Api::new(client, Duration::from_secs(5)).unwrap()
}

/// Store holding a valid-looking `A1`/`R1` pair.
pub(crate) async fn signed_in_store() -> Arc<SessionStore> {
    let store = SessionStore::in_memory();
    store.store_tokens("A1", Some("R1")).await.unwrap();
    Arc::new(store)
}
