//! Hosted backend clients: the `stores` REST table and the identity service.
//!
//! # Architecture
//!
//! - The backend is the source of truth for store rows and accounts; the
//!   site keeps only an in-memory copy of the store list and a mirrored
//!   session per visitor.
//! - Both services are reached over HTTPS with `reqwest`. Every request
//!   carries the anon API key; mutations and session calls also carry the
//!   signed-in user's access token.
//! - [`StoreTable`] and [`IdentityService`] are the seams the rest of the
//!   site depends on, so handlers can be exercised against in-memory fakes.

mod identity;
mod rest;

pub use identity::IdentityClient;
pub use rest::RestStoreTable;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mattress_locator_core::{Email, Identity, NewStore, StoreFields, StoreId, StoreRecord};
use reqwest::StatusCode;
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Email/password pair rejected, or the session is no longer valid.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// No row matched (missing, or hidden by row-level policy).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response was well-formed but not what the operation expects.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

impl BackendError {
    /// Message safe to show on the login and sign-up forms.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials(message) | Self::Api { message, .. }
                if !message.is_empty() =>
            {
                message.clone()
            }
            Self::InvalidCredentials(_) => "Invalid login credentials".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }

    /// Whether the backend rejected the caller's token or credentials.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials(_) | Self::Api { status: 401 | 403, .. }
        )
    }
}

/// Operations on the backend `stores` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoreTable: Send + Sync {
    /// All rows, newest first.
    async fn list(&self) -> Result<Vec<StoreRecord>, BackendError>;

    /// Insert a row and return it as stored.
    async fn insert(&self, access_token: &str, store: &NewStore)
    -> Result<StoreRecord, BackendError>;

    /// Overwrite the editable fields of a row and return it as stored.
    async fn update(
        &self,
        access_token: &str,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<StoreRecord, BackendError>;

    /// Delete a row.
    async fn delete(&self, access_token: &str, id: StoreId) -> Result<(), BackendError>;
}

/// Operations on the hosted identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Register an account; the service emails a verification link that
    /// lands on `redirect_to`.
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, BackendError>;

    /// Exchange email and password for a session.
    async fn sign_in(&self, email: &Email, password: &SecretString)
    -> Result<AuthSession, BackendError>;

    /// Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError>;

    /// Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// The account behind `access_token`.
    async fn current_user(&self, access_token: &str) -> Result<Identity, BackendError>;
}

/// A session issued by the identity service.
#[derive(Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("identity", &self.identity)
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a sign-up request.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The account must verify its email before signing in.
    ConfirmationSent,
    /// The service confirmed the account immediately and issued a session.
    SignedIn(AuthSession),
}

// =============================================================================
// Shared response handling
// =============================================================================

/// Error body shapes returned by the REST table and identity service.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    error_code: Option<String>,
}

impl ApiErrorBody {
    fn text(&self) -> Option<&str> {
        [
            &self.msg,
            &self.message,
            &self.error_description,
            &self.error,
        ]
        .into_iter()
        .find_map(|field| field.as_deref().filter(|s| !s.is_empty()))
    }

    fn is_invalid_credentials(&self) -> bool {
        self.error_code.as_deref() == Some("invalid_credentials")
            || self.error.as_deref() == Some("invalid_grant")
    }
}

/// Convert a non-success response body into a [`BackendError`].
fn api_error(status: StatusCode, body: &str) -> BackendError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .text()
        .map_or_else(|| body.chars().take(200).collect(), str::to_string);

    if parsed.is_invalid_credentials() {
        return BackendError::InvalidCredentials(message);
    }

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Read a response body, turning non-success statuses into errors.
async fn read_body(response: reqwest::Response) -> Result<String, BackendError> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        tracing::warn!(
            status = %status,
            body = %text.chars().take(500).collect::<String>(),
            "Backend returned non-success status"
        );
        return Err(api_error(status, &text));
    }

    Ok(text)
}

/// Read and deserialize a JSON response body.
async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let text = read_body(response).await?;
    serde_json::from_str(&text).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %text.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        BackendError::Parse(e)
    })
}

/// Join a path onto the backend base URL, keeping any base path.
fn endpoint(base: &url::Url, path: &str) -> Result<url::Url, BackendError> {
    let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), path);
    url::Url::parse(&joined).map_err(|e| BackendError::Unexpected(format!("bad endpoint {joined}: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("store 1".to_string());
        assert_eq!(err.to_string(), "Not found: store 1");

        let err = BackendError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");
    }

    #[test]
    fn test_api_error_identity_service_shape() {
        let body = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, BackendError::InvalidCredentials(ref m) if m == "Invalid login credentials"));
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Invalid login credentials");
    }

    #[test]
    fn test_api_error_legacy_grant_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Email not confirmed"}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, BackendError::InvalidCredentials(ref m) if m == "Email not confirmed"));
    }

    #[test]
    fn test_api_error_rest_table_shape() {
        let body = r#"{"code":"42501","details":null,"hint":null,"message":"new row violates row-level security policy"}"#;
        let err = api_error(StatusCode::FORBIDDEN, body);
        match &err {
            BackendError::Api { status, message } => {
                assert_eq!(*status, 403);
                assert_eq!(message, "new row violates row-level security policy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_api_error_non_json_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, BackendError::Api { status: 502, ref message } if message == "upstream down"));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_user_message_hides_transport_errors() {
        let err = BackendError::Unexpected("weird".to_string());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let base = url::Url::parse("https://example.co/backend/").unwrap();
        assert_eq!(
            endpoint(&base, "rest/v1/stores").unwrap().as_str(),
            "https://example.co/backend/rest/v1/stores"
        );
        let base = url::Url::parse("https://example.co").unwrap();
        assert_eq!(
            endpoint(&base, "auth/v1/user").unwrap().as_str(),
            "https://example.co/auth/v1/user"
        );
    }
}
