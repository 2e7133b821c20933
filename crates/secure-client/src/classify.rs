//! Failure classification
//!
//! Decides which failed responses enter the refresh path and sorts errors
//! into the categories callers react to. Only a 401 on a request that has
//! not been retried is recoverable here; everything else passes through.

use crate::error::Error;

/// What the response interceptor does with a failed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Enter the refresh gate and replay afterwards.
    Refresh,
    /// Hand the failure to the caller untouched.
    PassThrough,
}

/// Caller-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401 that was not recovered (already retried, or no refresh token).
    Unauthorized,
    /// The refresh itself failed; the session has been cleared.
    SessionExpired,
    /// Any other 4xx (validation, permissions, not found).
    Client,
    /// 5xx from the API.
    Server,
    /// No response at all (connect failure, timeout).
    Transport,
    /// Local problem building the request or decoding the response.
    Local,
}

/// Classify a failed response by status and retry marker.
pub fn classify_response(status: u16, retried: bool) -> Disposition {
    match (status, retried) {
        (401, false) => Disposition::Refresh,
        _ => Disposition::PassThrough,
    }
}

/// Classify an error returned to the caller.
pub fn classify_error(error: &Error) -> FailureKind {
    match error {
        Error::Status { status: 401, .. } => FailureKind::Unauthorized,
        Error::Status { status, .. } if *status >= 500 => FailureKind::Server,
        Error::Status { .. } => FailureKind::Client,
        Error::Refresh(_) => FailureKind::SessionExpired,
        Error::Transport { .. } => FailureKind::Transport,
        Error::InvalidRequest(_) | Error::Decode(_) => FailureKind::Local,
    }
}
