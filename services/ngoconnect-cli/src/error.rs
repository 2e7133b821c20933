//! CLI-specific error types

use thiserror::Error;

/// Failures the CLI reports with its own wording.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not signed in; run `ngoconnect login` first")]
    NotSignedIn,

    #[error("session expired; run `ngoconnect login` again")]
    SessionExpired,

    /// A request failed; carries the server's message when it sent one.
    #[error("{message}")]
    Request {
        message: String,
        #[source]
        source: api::Error,
    },
}

impl From<api::Error> for Error {
    fn from(e: api::Error) -> Self {
        if let api::Error::Client(inner) = &e {
            if secure_client::classify_error(inner) == secure_client::FailureKind::SessionExpired {
                return Error::SessionExpired;
            }
        }
        Error::Request {
            message: e.user_message(),
            source: e,
        }
    }
}
