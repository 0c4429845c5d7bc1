//! Authentication route handlers.
//!
//! Sign-in, sign-up and sign-out are delegated to the hosted identity
//! service; the resulting session is mirrored into the visitor's server-side
//! session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use mattress_locator_core::{AccessLevel, Email};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::{BackendError, SignUpOutcome};
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalUser, set_current_user};
use crate::models::{CurrentUser, session_keys};
use crate::services::AuthEvent;
use crate::state::AppState;

/// Message shown after a sign-up that needs email verification.
pub const VERIFY_EMAIL_MESSAGE: &str = "Check your email for verification link!";

// =============================================================================
// Form Types
// =============================================================================

/// Login and sign-up form data.
#[derive(Deserialize)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for CredentialsForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub email: String,
}

/// Sign-up confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register_success.html")]
pub struct RegisterSuccessTemplate {
    pub email: String,
    pub message: &'static str,
}

/// Status for a form re-rendered after the identity service refused it.
const fn rejection_status(err: &BackendError) -> StatusCode {
    match err {
        BackendError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
        BackendError::Api { status, .. } if *status >= 400 && *status < 500 => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::BAD_GATEWAY,
    }
}

/// Parse the submitted email, or describe why it is unusable.
fn parse_email(raw: &str) -> Result<Email, String> {
    Email::parse(raw).map_err(|e| format!("Please enter a valid email address ({e})."))
}

/// Store a freshly issued session and announce the sign-in.
async fn start_session(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    set_current_user(session, user).await?;
    set_sentry_user(&user.user_id(), Some(user.email().as_str()));
    state.auth_events().publish(AuthEvent::SignedIn {
        user_id: user.user_id(),
        email: user.email().clone(),
    });
    Ok(())
}

/// Where to send a user right after signing in.
fn landing_page(state: &AppState, user: &CurrentUser) -> &'static str {
    if state.config().admin_policy.access(Some(&user.identity)) == AccessLevel::Admin {
        "/admin"
    } else {
        "/"
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = match parse_email(&form.email) {
        Ok(email) => email,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                LoginTemplate {
                    error: Some(message),
                    email: form.email,
                },
            )
                .into_response();
        }
    };
    let password = SecretString::from(form.password);

    match state.identity().sign_in(&email, &password).await {
        Ok(auth) => {
            let user = CurrentUser::from(auth);
            if let Err(e) = start_session(&state, &session, &user).await {
                tracing::error!(error = %e, "Failed to store session");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    LoginTemplate {
                        error: Some("Could not start your session. Please try again.".to_string()),
                        email: email.to_string(),
                    },
                )
                    .into_response();
            }
            tracing::info!(user_id = %user.user_id(), "Signed in");
            Redirect::to(landing_page(&state, &user)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in failed");
            (
                rejection_status(&e),
                LoginTemplate {
                    error: Some(e.user_message()),
                    email: email.to_string(),
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the sign-up page.
pub async fn register_page() -> RegisterTemplate {
    RegisterTemplate {
        error: None,
        email: String::new(),
    }
}

/// Handle sign-up form submission.
///
/// The identity service emails a verification link that lands on the site
/// root. Projects that auto-confirm accounts return a session right away.
#[instrument(skip_all, fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CredentialsForm>,
) -> Response {
    let email = match parse_email(&form.email) {
        Ok(email) => email,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                RegisterTemplate {
                    error: Some(message),
                    email: form.email,
                },
            )
                .into_response();
        }
    };
    let password = SecretString::from(form.password);
    let redirect_to = state.config().email_redirect_url();

    match state
        .identity()
        .sign_up(&email, &password, &redirect_to)
        .await
    {
        Ok(SignUpOutcome::ConfirmationSent) => {
            state.auth_events().publish(AuthEvent::SignedUp {
                email: email.clone(),
                confirmed: false,
            });
            RegisterSuccessTemplate {
                email: email.to_string(),
                message: VERIFY_EMAIL_MESSAGE,
            }
            .into_response()
        }
        Ok(SignUpOutcome::SignedIn(auth)) => {
            state.auth_events().publish(AuthEvent::SignedUp {
                email: email.clone(),
                confirmed: true,
            });
            let user = CurrentUser::from(auth);
            if let Err(e) = start_session(&state, &session, &user).await {
                tracing::error!(error = %e, "Failed to store session after sign-up");
                return Redirect::to("/auth/login").into_response();
            }
            Redirect::to(landing_page(&state, &user)).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Sign-up failed");
            (
                rejection_status(&e),
                RegisterTemplate {
                    error: Some(e.user_message()),
                    email: email.to_string(),
                },
            )
                .into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout.
///
/// Revoking the remote session is best effort; the local session is always
/// cleared.
pub async fn logout(State(state): State<AppState>, session: Session) -> Redirect {
    let user: Option<CurrentUser> = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten();

    if let Some(user) = user {
        if let Err(e) = state.identity().sign_out(&user.access_token).await {
            tracing::warn!(error = %e, "Remote sign-out failed");
        }
        state.auth_events().publish(AuthEvent::SignedOut {
            user_id: user.user_id(),
        });
        tracing::info!(user_id = %user.user_id(), "Signed out");
    }

    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to clear session");
    }
    clear_sentry_user();

    Redirect::to("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status() {
        assert_eq!(
            rejection_status(&BackendError::InvalidCredentials(String::new())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            rejection_status(&BackendError::Api {
                status: 422,
                message: "Password should be at least 6 characters".to_string(),
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            rejection_status(&BackendError::Unexpected("x".to_string())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_parse_email_message() {
        assert!(parse_email("admin@example.com").is_ok());
        let message = parse_email("nope").unwrap_err();
        assert!(message.starts_with("Please enter a valid email address"));
    }

    #[test]
    fn test_credentials_form_debug_redacts_password() {
        let form = CredentialsForm {
            email: "a@example.com".to_string(),
            password: "hunter22".to_string(),
        };
        assert!(!format!("{form:?}").contains("hunter22"));
    }
}
