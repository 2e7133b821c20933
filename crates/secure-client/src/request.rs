//! Request and response values passed through the secure client

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// How the response body is read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse as JSON; an empty body becomes `Empty`, a non-JSON body falls back to `Text`.
    #[default]
    Json,
    Text,
    Bytes,
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub response_type: ResponseType,
    /// Overrides the client-wide timeout for this request.
    pub timeout: Option<Duration>,
}

/// A request as the caller describes it.
///
/// `retried` is the retry marker: set once the request has been through a
/// refresh cycle, after which a further 401 is terminal.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<serde_json::Value>,
    pub(crate) options: RequestOptions,
    pub(crate) retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            options: RequestOptions::default(),
            retried: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::InvalidRequest(format!("body is not serializable: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.options.response_type = response_type;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this request already went through a refresh cycle.
    pub fn is_retried(&self) -> bool {
        self.retried
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(serde_json::Value),
    Text(String),
    Bytes(Bytes),
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl ApiResponse {
    /// Deserialize the JSON body. An empty body deserializes from `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let value = match &self.body {
            ResponseBody::Json(v) => v.clone(),
            ResponseBody::Empty => serde_json::Value::Null,
            ResponseBody::Text(_) | ResponseBody::Bytes(_) => {
                return Err(Error::Decode("response body is not JSON".into()));
            }
        };
        serde_json::from_value(value).map_err(|e| Error::Decode(e.to_string()))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Decode raw body bytes according to the requested response type.
pub(crate) fn decode_body(raw: Bytes, response_type: ResponseType) -> ResponseBody {
    match response_type {
        ResponseType::Bytes => ResponseBody::Bytes(raw),
        ResponseType::Text => ResponseBody::Text(String::from_utf8_lossy(&raw).into_owned()),
        ResponseType::Json => {
            if raw.iter().all(u8::is_ascii_whitespace) {
                return ResponseBody::Empty;
            }
            match serde_json::from_slice(&raw) {
                Ok(v) => ResponseBody::Json(v),
                Err(_) => ResponseBody::Text(String::from_utf8_lossy(&raw).into_owned()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_query_and_body() {
        let req = ApiRequest::get("/api/projects/tasks/")
            .query("mine", true)
            .json(&serde_json::json!({"title": "Pack boxes"}))
            .unwrap();
        assert_eq!(req.method(), &Method::GET);
        assert_eq!(req.query, vec![("mine".to_string(), "true".to_string())]);
        assert_eq!(req.body.as_ref().unwrap()["title"], "Pack boxes");
        assert!(!req.is_retried());
    }

    #[test]
    fn json_decode_handles_empty_and_non_json() {
        assert_eq!(
            decode_body(Bytes::from_static(b""), ResponseType::Json),
            ResponseBody::Empty
        );
        assert_eq!(
            decode_body(Bytes::from_static(b"ok"), ResponseType::Json),
            ResponseBody::Text("ok".into())
        );
        assert_eq!(
            decode_body(Bytes::from_static(b"{\"id\":3}"), ResponseType::Json),
            ResponseBody::Json(serde_json::json!({"id": 3}))
        );
    }

    #[test]
    fn bytes_response_type_keeps_raw_body() {
        let body = decode_body(Bytes::from_static(b"%PDF-1.7"), ResponseType::Bytes);
        assert_eq!(body, ResponseBody::Bytes(Bytes::from_static(b"%PDF-1.7")));
    }

    #[test]
    fn empty_body_deserializes_as_unit_or_none() {
        let response = ApiResponse {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        };
        response.json::<()>().unwrap();
        let none: Option<serde_json::Value> = response.json().unwrap();
        assert!(none.is_none());
    }

    #[test]
    fn text_body_is_not_json() {
        let response = ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: ResponseBody::Text("hello".into()),
        };
        assert_eq!(response.text(), Some("hello"));
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(Error::Decode(_))
        ));
    }
}
