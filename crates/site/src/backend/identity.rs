//! Client for the hosted identity service (`/auth/v1`).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mattress_locator_core::{Email, Identity, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use url::Url;

use super::{AuthSession, BackendError, IdentityService, SignUpOutcome, endpoint, read_body, read_json};
use crate::config::BackendConfig;

const AUTH_PATH: &str = "auth/v1";

/// Client for the hosted identity service.
#[derive(Clone)]
pub struct IdentityClient {
    inner: Arc<IdentityClientInner>,
}

struct IdentityClientInner {
    client: reqwest::Client,
    base_url: Url,
    anon_key: SecretString,
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: UserId,
    email: Option<String>,
}

impl UserResponse {
    fn into_identity(self) -> Result<Identity, BackendError> {
        let raw = self
            .email
            .ok_or_else(|| BackendError::Unexpected(format!("user {} has no email", self.id)))?;
        let email = Email::parse(&raw)
            .map_err(|e| BackendError::Unexpected(format!("user {} email: {e}", self.id)))?;
        Ok(Identity {
            user_id: self.id,
            email,
        })
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    expires_at: Option<i64>,
    user: UserResponse,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<AuthSession, BackendError> {
        let expires_at = match self.expires_at.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            Some(at) => at,
            None => TimeDelta::try_seconds(self.expires_in)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .ok_or_else(|| {
                    BackendError::Unexpected(format!(
                        "token lifetime out of range: {}s",
                        self.expires_in
                    ))
                })?,
        };
        Ok(AuthSession {
            identity: self.user.into_identity()?,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        })
    }
}

/// Sign-up returns a full session when the project auto-confirms accounts,
/// otherwise just the unconfirmed user.
fn parse_sign_up(body: &str, now: DateTime<Utc>) -> Result<SignUpOutcome, BackendError> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("access_token").is_some_and(|token| !token.is_null()) {
        let tokens: TokenResponse = serde_json::from_value(value)?;
        return Ok(SignUpOutcome::SignedIn(tokens.into_session(now)?));
    }
    Ok(SignUpOutcome::ConfirmationSent)
}

impl IdentityClient {
    /// Create a new identity client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the backend URL
    /// cannot be joined with the auth path.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mattress-locator/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(IdentityClientInner {
                client,
                base_url: endpoint(&config.url, AUTH_PATH)?,
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    /// Build `{base}/auth/v1/{path}` with optional query pairs.
    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = endpoint(&self.inner.base_url, path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn post(&self, url: Url) -> reqwest::RequestBuilder {
        self.inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<AuthSession, BackendError> {
        let url = self.url("token", &[("grant_type", grant_type)])?;
        let response = self.post(url).json(&body).send().await?;
        let tokens: TokenResponse = read_json(response).await?;
        tokens.into_session(Utc::now())
    }
}

#[async_trait]
impl IdentityService for IdentityClient {
    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_up(
        &self,
        email: &Email,
        password: &SecretString,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        let url = self.url("signup", &[("redirect_to", redirect_to)])?;
        let body = json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        let response = self.post(url).json(&body).send().await?;

        let text = read_body(response).await?;
        let outcome = parse_sign_up(&text, Utc::now())?;
        tracing::info!(
            confirmed = matches!(outcome, SignUpOutcome::SignedIn(_)),
            "Account registered"
        );
        Ok(outcome)
    }

    #[instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        let body = json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
        });
        self.token_grant("password", body).await
    }

    #[instrument(skip_all)]
    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession, BackendError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    #[instrument(skip_all)]
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = self.url("logout", &[])?;
        let response = self.post(url).bearer_auth(access_token).send().await?;
        read_body(response).await?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn current_user(&self, access_token: &str) -> Result<Identity, BackendError> {
        let url = self.url("user", &[])?;
        let response = self
            .inner
            .client
            .get(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(access_token)
            .send()
            .await?;

        let user: UserResponse = read_json(response).await?;
        user.into_identity()
    }
}
