//! Session lifecycle notifications.
//!
//! Handlers publish an [`AuthEvent`] whenever a visitor's session changes.
//! Any number of listeners may subscribe; the binary logs every event.

use mattress_locator_core::{Email, UserId};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// A change in some visitor's session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: UserId, email: Email },
    SignedUp { email: Email, confirmed: bool },
    SignedOut { user_id: UserId },
    TokenRefreshed { user_id: UserId },
    /// Refresh failed; the visitor was signed out locally.
    SessionExpired { user_id: UserId },
}

impl AuthEvent {
    /// Short event name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SignedIn { .. } => "signed_in",
            Self::SignedUp { .. } => "signed_up",
            Self::SignedOut { .. } => "signed_out",
            Self::TokenRefreshed { .. } => "token_refreshed",
            Self::SessionExpired { .. } => "session_expired",
        }
    }
}

/// Broadcast channel for [`AuthEvent`]s.
#[derive(Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Notify current subscribers. Events with no subscribers are dropped.
    pub fn publish(&self, event: AuthEvent) {
        let _ = self.sender.send(event);
    }

    /// Receive every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.sender.subscribe()
    }
}

/// Log events until the channel closes.
pub async fn log_events(mut receiver: broadcast::Receiver<AuthEvent>) {
    loop {
        match receiver.recv().await {
            Ok(event) => tracing::info!(event = event.name(), details = ?event, "Auth state changed"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Auth event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
