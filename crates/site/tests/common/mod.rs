//! Shared fixtures for the site integration tests.
//!
//! The hosted backend is replaced by in-memory fakes so requests can be
//! driven end to end through the real router.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::{Duration, Utc};
use mattress_locator_core::{
    AdminPolicy, Email, Identity, NewStore, SearchMode, StoreFields, StoreId, StoreRecord, UserId,
};
use mattress_locator_site::backend::{
    AuthSession, BackendError, IdentityService, SignUpOutcome, StoreTable,
};
use mattress_locator_site::config::{BackendConfig, LocatorConfig, SentryConfig};
use mattress_locator_site::state::AppState;
use secrecy::{ExposeSecret, SecretString};
use tower::ServiceExt;
use url::Url;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const SHOPPER_EMAIL: &str = "shopper@example.com";
pub const PASSWORD: &str = "correct-horse";

/// In-memory `stores` table.
///
/// Listing can be made to fail with a given status, and every mutation can
/// be made to fail with a 500.
#[derive(Default)]
pub struct FakeStores {
    rows: Mutex<Vec<StoreRecord>>,
    inserts: AtomicUsize,
    list_status: AtomicU16,
    mutations_fail: AtomicBool,
}

impl FakeStores {
    pub fn with_rows(rows: Vec<StoreRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    /// Make `list` answer with this HTTP status.
    pub fn fail_list_with(&self, status: u16) {
        self.list_status.store(status, Ordering::SeqCst);
    }

    /// Make insert, update and delete fail.
    pub fn fail_mutations(&self) {
        self.mutations_fail.store(true, Ordering::SeqCst);
    }

    fn mutation_result(&self) -> Result<(), BackendError> {
        if self.mutations_fail.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "database unavailable".to_string(),
            });
        }
        Ok(())
    }

    /// Add a row behind the site's back, as another client would.
    pub fn push(&self, record: StoreRecord) {
        self.rows.lock().unwrap().push(record);
    }

    /// Number of insert calls that reached the table.
    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn rows(&self) -> Vec<StoreRecord> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoreTable for FakeStores {
    async fn list(&self) -> Result<Vec<StoreRecord>, BackendError> {
        match self.list_status.load(Ordering::SeqCst) {
            0 => Ok(self.rows()),
            status => Err(BackendError::Api {
                status,
                message: "list failed".to_string(),
            }),
        }
    }

    async fn insert(
        &self,
        _access_token: &str,
        store: &NewStore,
    ) -> Result<StoreRecord, BackendError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.mutation_result()?;
        let record = record_from(StoreId::random(), &store.fields, store.created_by);
        self.rows.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        _access_token: &str,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<StoreRecord, BackendError> {
        self.mutation_result()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        *row = record_from(id, fields, row.created_by);
        Ok(row.clone())
    }

    async fn delete(&self, _access_token: &str, id: StoreId) -> Result<(), BackendError> {
        self.mutation_result()?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn record_from(id: StoreId, fields: &StoreFields, created_by: Option<UserId>) -> StoreRecord {
    StoreRecord {
        id,
        name: fields.name.clone(),
        address: fields.address.clone(),
        city: fields.city.clone(),
        state: fields.state.clone(),
        zip_code: fields.zip_code.clone(),
        phone: fields.phone.clone(),
        hours: fields.hours.clone(),
        created_at: Some(Utc::now()),
        created_by,
    }
}

/// Identity service with a fixed set of accounts sharing one password.
///
/// Refreshing always fails, so a session issued with a lifetime inside the
/// refresh leeway ends on the next request.
pub struct FakeIdentity {
    accounts: Vec<Identity>,
    token_lifetime: Duration,
}

impl FakeIdentity {
    pub fn new(emails: &[&str]) -> Self {
        Self {
            token_lifetime: Duration::hours(1),
            accounts: emails
                .iter()
                .map(|email| Identity {
                    user_id: UserId::random(),
                    email: Email::parse(email).unwrap(),
                })
                .collect(),
        }
    }

    /// Issue sessions that expire `lifetime` after sign-in.
    pub fn with_token_lifetime(mut self, lifetime: Duration) -> Self {
        self.token_lifetime = lifetime;
        self
    }

    pub fn user_id(&self, email: &str) -> UserId {
        let email = Email::parse(email).unwrap();
        self.accounts
            .iter()
            .find(|account| account.email == email)
            .map(|account| account.user_id)
            .unwrap()
    }

    fn session_for(&self, identity: &Identity) -> AuthSession {
        AuthSession {
            identity: identity.clone(),
            access_token: format!("access-{}", identity.user_id),
            refresh_token: format!("refresh-{}", identity.user_id),
            expires_at: Utc::now() + self.token_lifetime,
        }
    }
}

#[async_trait]
impl IdentityService for FakeIdentity {
    async fn sign_up(
        &self,
        _email: &Email,
        _password: &SecretString,
        _redirect_to: &str,
    ) -> Result<SignUpOutcome, BackendError> {
        Ok(SignUpOutcome::ConfirmationSent)
    }

    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthSession, BackendError> {
        self.accounts
            .iter()
            .find(|account| &account.email == email && password.expose_secret() == PASSWORD)
            .map(|account| self.session_for(account))
            .ok_or_else(|| BackendError::InvalidCredentials("Invalid login credentials".to_string()))
    }

    async fn refresh(&self, _refresh_token: &str) -> Result<AuthSession, BackendError> {
        Err(BackendError::InvalidCredentials("Refresh token expired".to_string()))
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<Identity, BackendError> {
        self.accounts
            .iter()
            .find(|account| access_token == format!("access-{}", account.user_id))
            .cloned()
            .ok_or_else(|| BackendError::InvalidCredentials("invalid JWT".to_string()))
    }
}

pub fn test_config() -> LocatorConfig {
    LocatorConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        backend: BackendConfig {
            url: Url::parse("https://project.example.co").unwrap(),
            anon_key: SecretString::from("anon-key"),
        },
        admin_policy: AdminPolicy::AllowList(vec![Email::parse(ADMIN_EMAIL).unwrap()]),
        search_mode: SearchMode::Substring,
        rate_limit_auth: false,
        trusted_proxy: false,
        sentry: SentryConfig::default(),
    }
}

pub fn store(name: &str, city: &str, state: &str, zip_code: &str) -> StoreRecord {
    StoreRecord {
        id: StoreId::random(),
        name: name.to_string(),
        address: "123 Main St".to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip_code: zip_code.to_string(),
        phone: None,
        hours: None,
        created_at: None,
        created_by: None,
    }
}

/// A router over the fakes, plus handles on both of them.
pub struct TestSite {
    pub app: Router,
    pub stores: Arc<FakeStores>,
    pub identity: Arc<FakeIdentity>,
}

impl TestSite {
    pub fn new(rows: Vec<StoreRecord>) -> Self {
        Self::build(
            test_config(),
            FakeStores::with_rows(rows),
            FakeIdentity::new(&[ADMIN_EMAIL, SHOPPER_EMAIL]),
        )
    }

    pub fn build(config: LocatorConfig, stores: FakeStores, identity: FakeIdentity) -> Self {
        let stores = Arc::new(stores);
        let identity = Arc::new(identity);
        let state = AppState::with_backends(config, stores.clone(), identity.clone());
        Self {
            app: mattress_locator_site::app(state),
            stores,
            identity,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            request = request.header(header::COOKIE, cookie);
        }
        self.app
            .clone()
            .oneshot(request.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }

    /// Sign in and return the session cookie (`name=value`).
    pub async fn sign_in(&self, email: &str) -> String {
        let body = format!("email={}&password={PASSWORD}", urlencoding::encode(email));
        let response = self.post_form("/auth/login", &body, None).await;
        assert!(response.status().is_redirection(), "login failed: {}", response.status());
        session_cookie(&response).expect("login sets a session cookie")
    }
}

pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("ml_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
