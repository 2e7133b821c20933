//! Error types for the API layer

/// Errors returned by the auth context and resource clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A request failed (status, transport, refresh, decode).
    #[error(transparent)]
    Client(#[from] secure_client::Error),

    /// The session store could not be read or written.
    #[error("session store: {0}")]
    Session(#[from] session::Error),

    /// Input rejected before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// HTTP status behind this error, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Client(e) => e.status(),
            Error::Session(session::Error::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Prefers the message carried in the server's error body and falls back
    /// to the error's own description.
    pub fn user_message(&self) -> String {
        match self {
            Error::Client(e) => e.server_message().unwrap_or_else(|| e.to_string()),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_body() {
        let err = Error::Client(secure_client::Error::Status {
            status: 400,
            body: r#"{"non_field_errors":["Unable to log in with provided credentials."]}"#.into(),
        });
        assert_eq!(
            err.user_message(),
            "Unable to log in with provided credentials."
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn user_message_falls_back_to_display() {
        let err = Error::InvalidInput("amount must be positive".into());
        assert_eq!(err.user_message(), "invalid input: amount must be positive");
        assert_eq!(err.status(), None);
    }
}
