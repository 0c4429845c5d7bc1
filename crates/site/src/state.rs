//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::{BackendError, IdentityClient, IdentityService, RestStoreTable, StoreTable};
use crate::config::LocatorConfig;
use crate::services::{AuthEvents, DirectoryService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the store directory and the identity service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LocatorConfig,
    directory: DirectoryService,
    identity: Arc<dyn IdentityService>,
    auth_events: AuthEvents,
}

impl AppState {
    /// Create application state backed by the hosted backend.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client cannot be built.
    pub fn new(config: LocatorConfig) -> Result<Self, BackendError> {
        let stores = RestStoreTable::new(&config.backend)?;
        let identity = IdentityClient::new(&config.backend)?;
        Ok(Self::with_backends(config, Arc::new(stores), Arc::new(identity)))
    }

    /// Create application state over arbitrary backend implementations.
    #[must_use]
    pub fn with_backends(
        config: LocatorConfig,
        stores: Arc<dyn StoreTable>,
        identity: Arc<dyn IdentityService>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                directory: DirectoryService::new(stores),
                identity,
                auth_events: AuthEvents::new(),
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.inner.config
    }

    /// Get a reference to the store directory service.
    #[must_use]
    pub fn directory(&self) -> &DirectoryService {
        &self.inner.directory
    }

    /// Get a reference to the identity service client.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityService {
        self.inner.identity.as_ref()
    }

    /// Get a reference to the auth event channel.
    #[must_use]
    pub fn auth_events(&self) -> &AuthEvents {
        &self.inner.auth_events
    }
}
