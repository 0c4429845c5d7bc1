//! Authentication extractors.
//!
//! The visitor's session mirrors the identity service session. Extractors
//! refresh it when the access token is about to expire; a failed refresh
//! signs the visitor out locally.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use mattress_locator_core::AccessLevel;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthEvent;
use crate::state::AppState;

/// Extractor for the signed-in user, if any.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(OptionalUser(user): OptionalUser) -> impl IntoResponse {
///     match user {
///         Some(u) => format!("Hello, {}!", u.email()),
///         None => "Hello, guest!".to_string(),
///     }
/// }
/// ```
pub struct OptionalUser(pub Option<CurrentUser>);

/// Extractor that requires a signed-in user.
///
/// Signed-out visitors are redirected to the login page.
pub struct RequireUser(pub CurrentUser);

/// Extractor that requires a user the admin policy grants the controls to.
///
/// The session is re-checked against the identity service first, so revoked
/// accounts lose access before they can mutate anything.
pub struct RequireManager(pub CurrentUser);

/// Error returned when an extractor's requirements are not met.
#[derive(Debug)]
pub enum AuthRejection {
    /// Not signed in (or the session ended); send to the login page.
    RedirectToLogin,
    /// Signed in but not allowed to manage stores.
    Forbidden,
    /// The identity service could not be reached.
    Unavailable,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to manage store listings.",
            )
                .into_response(),
            Self::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Sign-in is temporarily unavailable. Please try again.",
            )
                .into_response(),
        }
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(session) = parts.extensions.get::<Session>().cloned() else {
            return Ok(Self(None));
        };
        Ok(Self(load_current_user(&session, state).await))
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::RedirectToLogin)?;

        load_current_user(&session, state)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(user) = RequireUser::from_request_parts(parts, state).await?;

        match state.identity().current_user(&user.access_token).await {
            Ok(identity) if identity.user_id == user.user_id() => {}
            Ok(_) => {
                tracing::warn!(user_id = %user.user_id(), "Session token belongs to another account");
                sign_out_locally(parts, &user, state).await;
                return Err(AuthRejection::RedirectToLogin);
            }
            Err(e) if e.is_unauthorized() => {
                tracing::info!(user_id = %user.user_id(), "Session rejected by identity service");
                sign_out_locally(parts, &user, state).await;
                return Err(AuthRejection::RedirectToLogin);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to confirm session");
                return Err(AuthRejection::Unavailable);
            }
        }

        if state.config().admin_policy.access(Some(&user.identity)) != AccessLevel::Admin {
            tracing::warn!(
                user_id = %user.user_id(),
                policy = state.config().admin_policy.name(),
                "Non-admin denied store management"
            );
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

/// Read the session user, refreshing tokens that are about to expire.
///
/// Returns `None` if nobody is signed in or the refresh failed.
async fn load_current_user(session: &Session, state: &AppState) -> Option<CurrentUser> {
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;

    if !user.needs_refresh(Utc::now()) {
        set_sentry_user(&user.user_id().to_string(), Some(user.email().as_str()));
        return Some(user);
    }

    match state.identity().refresh(&user.refresh_token).await {
        Ok(refreshed) => {
            let refreshed = CurrentUser::from(refreshed);
            if let Err(e) = set_current_user(session, &refreshed).await {
                tracing::error!(error = %e, "Failed to store refreshed session");
            }
            state.auth_events().publish(AuthEvent::TokenRefreshed {
                user_id: refreshed.user_id(),
            });
            set_sentry_user(&refreshed.user_id().to_string(), Some(refreshed.email().as_str()));
            Some(refreshed)
        }
        Err(e) => {
            tracing::info!(user_id = %user.user_id(), error = %e, "Session refresh failed, signing out");
            if let Err(e) = clear_current_user(session).await {
                tracing::error!(error = %e, "Failed to clear expired session");
            }
            state.auth_events().publish(AuthEvent::SessionExpired {
                user_id: user.user_id(),
            });
            clear_sentry_user();
            None
        }
    }
}

async fn sign_out_locally(parts: &Parts, user: &CurrentUser, state: &AppState) {
    if let Some(session) = parts.extensions.get::<Session>() {
        if let Err(e) = clear_current_user(session).await {
            tracing::error!(error = %e, "Failed to clear session");
        }
    }
    state.auth_events().publish(AuthEvent::SessionExpired {
        user_id: user.user_id(),
    });
    clear_sentry_user();
}

/// Helper to set the current user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
