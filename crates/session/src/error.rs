//! Error types for session storage and token endpoint calls

/// Errors from session operations.
///
/// `Clone` because one refresh failure is delivered to every request that was
/// queued behind it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token endpoint returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid token response: {0}")]
    InvalidResponse(String),

    #[error("no refresh token in session")]
    MissingRefreshToken,

    #[error("token refresh abandoned before it settled")]
    Abandoned,

    #[error("session file parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;
