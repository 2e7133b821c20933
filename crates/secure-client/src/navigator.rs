//! Redirect-to-login side effect
//!
//! When the session cannot be recovered the client clears the stored tokens
//! and asks the front end to send the user back to the login entry point.
//! The client only knows this seam; what a "redirect" means (a route change,
//! a CLI message, a window reload) belongs to the front end.

use tokio::sync::broadcast;
use tracing::warn;

/// Navigation requests emitted by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Login { path: String },
}

/// Receives the irrecoverable-authentication side effect.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self);
}

/// Default navigator: logs the redirect and broadcasts it to subscribers.
pub struct LoginRedirect {
    path: String,
    tx: broadcast::Sender<Navigation>,
}

impl LoginRedirect {
    pub fn new(path: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(16);
        Self {
            path: path.into(),
            tx,
        }
    }

    /// Subscribe to navigation events.
    pub fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.tx.subscribe()
    }
}

impl Default for LoginRedirect {
    fn default() -> Self {
        Self::new(session::LOGIN_ROUTE)
    }
}

impl Navigator for LoginRedirect {
    fn redirect_to_login(&self) {
        warn!(path = %self.path, "session expired, redirecting to login");
        // No subscribers is fine: the redirect is advisory for headless callers.
        let _ = self.tx.send(Navigation::Login {
            path: self.path.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn redirect_reaches_subscribers() {
        let navigator = LoginRedirect::new("/login");
        let mut rx = navigator.subscribe();

        navigator.redirect_to_login();

        assert_eq!(
            rx.recv().await.unwrap(),
            Navigation::Login {
                path: "/login".into()
            }
        );
    }

    #[test]
    fn redirect_without_subscribers_does_not_panic() {
        LoginRedirect::default().redirect_to_login();
    }
}
