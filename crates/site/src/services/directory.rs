//! Store directory service.
//!
//! Owns the in-memory [`StoreDirectory`] and keeps it in step with the backend
//! `stores` table. Mutations go to the backend first; once the backend
//! confirms, the change is applied locally and the list is re-fetched.

use std::sync::Arc;

use chrono::Utc;
use mattress_locator_core::{NewStore, StoreDirectory, StoreFields, StoreId, StoreRecord, UserId};
use tokio::sync::RwLock;

use crate::backend::{BackendError, StoreTable};

/// Shared handle to the store directory.
#[derive(Clone)]
pub struct DirectoryService {
    table: Arc<dyn StoreTable>,
    directory: Arc<RwLock<StoreDirectory>>,
}

impl DirectoryService {
    /// Create a service with an empty, never-loaded directory.
    #[must_use]
    pub fn new(table: Arc<dyn StoreTable>) -> Self {
        Self {
            table,
            directory: Arc::new(RwLock::new(StoreDirectory::new())),
        }
    }

    /// Re-fetch the full list from the backend and replace the local copy.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the previous snapshot is kept.
    pub async fn refresh(&self) -> Result<usize, BackendError> {
        let stores = self.table.list().await?;
        let count = stores.len();
        self.directory.write().await.replace(stores, Utc::now());
        tracing::debug!(count, "Store directory refreshed");
        Ok(count)
    }

    /// Refresh, logging failures instead of returning them.
    pub async fn refresh_or_keep(&self) {
        if let Err(e) = self.refresh().await {
            let last_refresh = self.directory.read().await.refreshed_at();
            tracing::warn!(
                error = %e,
                last_refresh = ?last_refresh,
                "Failed to refresh store directory, serving last snapshot"
            );
        }
    }

    /// A copy of the current directory.
    pub async fn snapshot(&self) -> StoreDirectory {
        self.directory.read().await.clone()
    }

    /// Look up a single store in the local copy.
    pub async fn get(&self, id: StoreId) -> Option<StoreRecord> {
        self.directory.read().await.get(id).cloned()
    }

    /// Insert a store, put it at the head of the list, then re-fetch.
    ///
    /// # Errors
    ///
    /// Returns the backend error from the insert; the directory is unchanged.
    pub async fn create(
        &self,
        access_token: &str,
        fields: StoreFields,
        created_by: UserId,
    ) -> Result<StoreRecord, BackendError> {
        let new_store = NewStore {
            fields,
            created_by: Some(created_by),
        };
        let created = self.table.insert(access_token, &new_store).await?;
        self.directory.write().await.prepend(created.clone());
        self.refresh_or_keep().await;
        Ok(created)
    }

    /// Overwrite a store's fields, apply the change locally, then re-fetch.
    ///
    /// # Errors
    ///
    /// Returns the backend error from the update; the directory is unchanged.
    pub async fn update(
        &self,
        access_token: &str,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<StoreRecord, BackendError> {
        let updated = self.table.update(access_token, id, fields).await?;
        if !self.directory.write().await.apply_update(updated.clone()) {
            tracing::debug!(store_id = %id, "Updated store was not in the local directory");
        }
        self.refresh_or_keep().await;
        Ok(updated)
    }

    /// Delete a store, drop it locally, then re-fetch.
    ///
    /// # Errors
    ///
    /// Returns the backend error from the delete; the directory is unchanged.
    pub async fn delete(&self, access_token: &str, id: StoreId) -> Result<(), BackendError> {
        self.table.delete(access_token, id).await?;
        self.directory.write().await.remove(id);
        self.refresh_or_keep().await;
        Ok(())
    }
}
