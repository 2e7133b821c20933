//! Authenticated HTTP client with coordinated token refresh
//!
//! `SecureClient` issues requests against the API base URL with the stored
//! access token attached as a bearer credential. When a response comes back
//! 401, exactly one token refresh runs at a time process-wide; requests that
//! hit 401 while it is in flight wait in a FIFO queue and are replayed with
//! the refreshed token once it settles.
//!
//! Request lifecycle:
//! 1. Request interceptor attaches `Authorization: Bearer <access>` if a token exists
//! 2. Non-401 failures and 401s on already-retried requests go straight to the caller
//! 3. First 401 marks the request retried and enters the `RefreshGate`
//! 4. Leader refreshes, stores tokens, releases waiters in arrival order, replays itself
//! 5. Refresh failure rejects everyone, clears the session, redirects to login

pub mod classify;
pub mod client;
pub mod error;
pub mod gate;
pub mod metrics;
pub mod navigator;
pub mod request;

#[cfg(test)]
mod test_support;

pub use classify::{Disposition, FailureKind, classify_error, classify_response};
pub use client::{DEFAULT_TIMEOUT, SecureClient, SecureClientBuilder};
pub use error::{Error, Result};
pub use gate::{Admission, Lease, RefreshGate, Release, Waiter};
pub use navigator::{LoginRedirect, Navigation, Navigator};
pub use request::{ApiRequest, ApiResponse, RequestOptions, ResponseBody, ResponseType};
