//! Error types for secure client requests

/// Errors surfaced to callers of the secure client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request never produced a response (connect, timeout, body read).
    #[error("request to {url} failed: {message}")]
    Transport {
        url: String,
        message: String,
        timeout: bool,
    },

    /// The server answered with a non-2xx status.
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The token refresh that this request depended on failed.
    #[error("session refresh failed: {0}")]
    Refresh(#[from] session::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("response decode failed: {0}")]
    Decode(String),
}

/// Result alias for secure client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Keys inspected, in order, when pulling a human-readable message out of an
/// error body.
const MESSAGE_KEYS: &[&str] = &["detail", "error", "message"];

impl Error {
    /// HTTP status behind this error, including a rejected refresh call.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            Error::Refresh(session::Error::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Whether this is a plain authorization failure from the server.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Status { status: 401, .. })
    }

    /// Message from the server body, if it carried one.
    ///
    /// Looks at `non_field_errors[0]` first, then `detail`, `error`, `message`.
    pub fn server_message(&self) -> Option<String> {
        let body = match self {
            Error::Status { body, .. } => body,
            Error::Refresh(session::Error::Rejected { body, .. }) => body,
            _ => return None,
        };
        let json: serde_json::Value = serde_json::from_str(body).ok()?;

        if let Some(first) = json
            .get("non_field_errors")
            .and_then(|v| v.as_array())
            .and_then(|a| a.first())
            .and_then(|v| v.as_str())
        {
            return Some(first.to_string());
        }

        MESSAGE_KEYS
            .iter()
            .find_map(|key| json.get(*key).and_then(|v| v.as_str()))
            .map(str::to_string)
    }
}
