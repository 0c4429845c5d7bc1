//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page (marketing sections + locator, ?q=)
//! GET  /health                    - Liveness
//! GET  /health/ready              - Readiness (backend reachable)
//!
//! # Auth
//! GET  /auth/login                - Login page
//! POST /auth/login                - Sign in
//! GET  /auth/register             - Sign-up page
//! POST /auth/register             - Sign up
//! POST /auth/logout               - Sign out
//!
//! # Admin (requires an admin session)
//! GET  /admin                     - Admin panel
//! POST /admin/stores              - Create store
//! GET  /admin/stores/{id}/edit    - Panel with inline edit form
//! POST /admin/stores/{id}         - Update store
//! POST /admin/stores/{id}/delete  - Delete store
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod home;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::LocatorConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Rate limited per client IP when `config.rate_limit_auth` is set.
pub fn auth_routes(config: &LocatorConfig) -> Router<AppState> {
    let router = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout));

    if config.rate_limit_auth {
        router.layer(auth_rate_limiter(config.trusted_proxy))
    } else {
        router
    }
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::panel))
        .route("/stores", post(admin::create_store))
        .route("/stores/{id}", post(admin::update_store))
        .route("/stores/{id}/edit", get(admin::edit_store))
        .route("/stores/{id}/delete", post(admin::delete_store))
}

/// Create all routes for the site.
pub fn routes(config: &LocatorConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/auth", auth_routes(config))
        .nest("/admin", admin_routes())
}
