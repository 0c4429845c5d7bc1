//! Session-related types.
//!
//! Types stored in the session for authentication state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use mattress_locator_core::{Email, Identity, UserId};

use crate::backend::AuthSession;

/// Refresh this long before the access token actually expires.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Mirror of the identity service session, stored server-side per visitor.
///
/// Implements `Debug` manually to redact the tokens.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl CurrentUser {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.identity.email
    }

    /// Whether the access token should be refreshed before use.
    #[must_use]
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }
}

impl From<AuthSession> for CurrentUser {
    fn from(session: AuthSession) -> Self {
        Self {
            identity: session.identity,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_at: session.expires_at,
        }
    }
}

impl std::fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurrentUser")
            .field("identity", &self.identity)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
