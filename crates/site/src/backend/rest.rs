//! REST client for the backend `stores` table.

use std::sync::Arc;

use async_trait::async_trait;
use mattress_locator_core::{NewStore, StoreFields, StoreId, StoreRecord};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;
use url::Url;

use super::{BackendError, StoreTable, endpoint, read_body, read_json};
use crate::config::BackendConfig;

const STORES_PATH: &str = "rest/v1/stores";

/// Client for the `stores` table exposed by the hosted backend.
#[derive(Clone)]
pub struct RestStoreTable {
    inner: Arc<RestStoreTableInner>,
}

struct RestStoreTableInner {
    client: reqwest::Client,
    stores_url: Url,
    anon_key: SecretString,
}

impl RestStoreTable {
    /// Create a new table client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the backend URL
    /// cannot be joined with the table path.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("mattress-locator/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            inner: Arc::new(RestStoreTableInner {
                client,
                stores_url: endpoint(&config.url, STORES_PATH)?,
                anon_key: config.anon_key.clone(),
            }),
        })
    }

    fn list_url(&self) -> Url {
        let mut url = self.inner.stores_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");
        url
    }

    fn row_url(&self, id: StoreId) -> Url {
        let mut url = self.inner.stores_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    /// Attach the API key and bearer token every table request carries.
    fn authorize(&self, request: reqwest::RequestBuilder, bearer: &str) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer)
    }
}

/// Take the single row a mutation with `return=representation` echoes back.
fn single_row(rows: Vec<StoreRecord>, id: Option<StoreId>) -> Result<StoreRecord, BackendError> {
    rows.into_iter().next().ok_or_else(|| match id {
        Some(id) => BackendError::NotFound(format!("store {id}")),
        None => BackendError::Unexpected("insert returned no rows".to_string()),
    })
}

#[async_trait]
impl StoreTable for RestStoreTable {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<StoreRecord>, BackendError> {
        let request = self.inner.client.get(self.list_url());
        let response = self
            .authorize(request, self.inner.anon_key.expose_secret())
            .send()
            .await?;

        let stores: Vec<StoreRecord> = read_json(response).await?;
        tracing::debug!(count = stores.len(), "Fetched store list");
        Ok(stores)
    }

    #[instrument(skip(self, access_token, store), fields(store_name = %store.fields.name))]
    async fn insert(
        &self,
        access_token: &str,
        store: &NewStore,
    ) -> Result<StoreRecord, BackendError> {
        let request = self
            .inner
            .client
            .post(self.inner.stores_url.clone())
            .header("Prefer", "return=representation")
            .json(&[store]);
        let response = self.authorize(request, access_token).send().await?;

        let rows: Vec<StoreRecord> = read_json(response).await?;
        let created = single_row(rows, None)?;
        tracing::info!(store_id = %created.id, "Store inserted");
        Ok(created)
    }

    #[instrument(skip(self, access_token, fields), fields(store_id = %id))]
    async fn update(
        &self,
        access_token: &str,
        id: StoreId,
        fields: &StoreFields,
    ) -> Result<StoreRecord, BackendError> {
        let request = self
            .inner
            .client
            .patch(self.row_url(id))
            .header("Prefer", "return=representation")
            .json(fields);
        let response = self.authorize(request, access_token).send().await?;

        let rows: Vec<StoreRecord> = read_json(response).await?;
        let updated = single_row(rows, Some(id))?;
        tracing::info!("Store updated");
        Ok(updated)
    }

    #[instrument(skip(self, access_token), fields(store_id = %id))]
    async fn delete(&self, access_token: &str, id: StoreId) -> Result<(), BackendError> {
        let request = self
            .inner
            .client
            .delete(self.row_url(id))
            .header("Prefer", "return=representation");
        let response = self.authorize(request, access_token).send().await?;

        let body = read_body(response).await?;
        let rows: Vec<StoreRecord> = if body.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&body)?
        };
        single_row(rows, Some(id))?;
        tracing::info!("Store deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn table() -> RestStoreTable {
        RestStoreTable::new(&BackendConfig {
            url: Url::parse("https://project.example.co").unwrap(),
            anon_key: SecretString::from("anon"),
        })
        .unwrap()
    }

    #[test]
    fn test_list_url_orders_newest_first() {
        assert_eq!(
            table().list_url().as_str(),
            "https://project.example.co/rest/v1/stores?select=*&order=created_at.desc"
        );
    }

    #[test]
    fn test_row_url_filters_by_id() {
        let id: StoreId = "6f1c2f8e-2b7d-4a43-9d7e-7c1a0c2f5b11".parse().unwrap();
        assert_eq!(
            table().row_url(id).as_str(),
            "https://project.example.co/rest/v1/stores?id=eq.6f1c2f8e-2b7d-4a43-9d7e-7c1a0c2f5b11"
        );
    }

    #[test]
    fn test_single_row_empty_is_not_found() {
        let id = StoreId::random();
        assert!(matches!(
            single_row(Vec::new(), Some(id)),
            Err(BackendError::NotFound(_))
        ));
        assert!(matches!(
            single_row(Vec::new(), None),
            Err(BackendError::Unexpected(_))
        ));
    }
}
