//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LOCATOR_BASE_URL` - Public URL for the site (cookie security, sign-up redirect)
//! - `BACKEND_URL` - Hosted backend base URL (REST table + identity service)
//! - `BACKEND_ANON_KEY` - Public anon API key for the hosted backend
//! - `ADMIN_EMAILS` - Comma-separated admin allow-list (required for `allow-list` policy)
//!
//! ## Optional
//! - `LOCATOR_HOST` - Bind address (default: 127.0.0.1)
//! - `LOCATOR_PORT` - Listen port (default: 3000)
//! - `ADMIN_POLICY` - `allow-list` (default) or `owner`
//! - `LOCATOR_SEARCH_MODE` - `substring` (default) or `state`
//! - `LOCATOR_RATE_LIMIT` - Rate limit auth endpoints (default: true)
//! - `LOCATOR_TRUSTED_PROXY` - Key rate limits on `X-Forwarded-For`/`X-Real-IP`
//!   instead of the socket peer (default: false; only enable behind a proxy
//!   that overwrites those headers)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};

use mattress_locator_core::{AdminPolicy, Email, SearchMode};
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct LocatorConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site, without a trailing slash
    pub base_url: String,
    /// Hosted backend configuration
    pub backend: BackendConfig,
    /// Who may manage store listings
    pub admin_policy: AdminPolicy,
    /// How locator queries are matched
    pub search_mode: SearchMode,
    /// Whether auth endpoints are rate limited
    pub rate_limit_auth: bool,
    /// Whether client IPs are read from proxy headers
    pub trusted_proxy: bool,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend base URL, e.g. `https://project.example.co`
    pub url: Url,
    /// Public anon API key sent with every request
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Sentry configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl LocatorConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("LOCATOR_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOCATOR_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("LOCATOR_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOCATOR_PORT".to_string(), e.to_string()))?;
        let base_url = parse_base_url(&get_required_env("LOCATOR_BASE_URL")?)?;

        let backend = BackendConfig::from_env()?;
        let admin_policy = parse_admin_policy(
            &get_env_or_default("ADMIN_POLICY", "allow-list"),
            get_optional_env("ADMIN_EMAILS").as_deref(),
        )?;
        let search_mode = get_env_or_default("LOCATOR_SEARCH_MODE", "substring")
            .parse::<SearchMode>()
            .map_err(|e| ConfigError::InvalidEnvVar("LOCATOR_SEARCH_MODE".to_string(), e))?;
        let rate_limit_auth = parse_bool(
            "LOCATOR_RATE_LIMIT",
            &get_env_or_default("LOCATOR_RATE_LIMIT", "true"),
        )?;
        let trusted_proxy = parse_bool(
            "LOCATOR_TRUSTED_PROXY",
            &get_env_or_default("LOCATOR_TRUSTED_PROXY", "false"),
        )?;
        let sentry = SentryConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            backend,
            admin_policy,
            search_mode,
            rate_limit_auth,
            trusted_proxy,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Where the identity service sends users after they verify their email.
    #[must_use]
    pub fn email_redirect_url(&self) -> String {
        format!("{}/", self.base_url)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("BACKEND_URL")?;
        let url = Url::parse(raw.trim_end_matches('/'))
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;

        Ok(Self {
            url,
            anon_key: get_required_secret("BACKEND_ANON_KEY")?,
        })
    }
}

impl SentryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            dsn: get_optional_env("SENTRY_DSN"),
            environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate the public base URL and strip any trailing slash.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar("LOCATOR_BASE_URL".to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "LOCATOR_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Build the admin policy from `ADMIN_POLICY` and `ADMIN_EMAILS`.
fn parse_admin_policy(policy: &str, emails: Option<&str>) -> Result<AdminPolicy, ConfigError> {
    match policy.trim().to_ascii_lowercase().as_str() {
        "owner" => Ok(AdminPolicy::Owner),
        "allow-list" | "allowlist" => {
            let raw = emails.ok_or_else(|| ConfigError::MissingEnvVar("ADMIN_EMAILS".to_string()))?;
            let emails = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    Email::parse(s).map_err(|e| {
                        ConfigError::InvalidEnvVar("ADMIN_EMAILS".to_string(), format!("{s}: {e}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            if emails.is_empty() {
                return Err(ConfigError::InvalidEnvVar(
                    "ADMIN_EMAILS".to_string(),
                    "at least one address is required".to_string(),
                ));
            }
            Ok(AdminPolicy::AllowList(emails))
        }
        other => Err(ConfigError::InvalidEnvVar(
            "ADMIN_POLICY".to_string(),
            format!("unknown policy '{other}' (expected 'allow-list' or 'owner')"),
        )),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

fn parse_rate(key: &str, default: &str) -> Result<f32, ConfigError> {
    let rate = get_env_or_default(key, default)
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be between 0.0 and 1.0".to_string(),
        ))
    }
}
