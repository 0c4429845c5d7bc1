//! Home page route handler: marketing sections plus the store locator.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use mattress_locator_core::{StoreRecord, search_stores};
use serde::Deserialize;
use tracing::instrument;

use crate::content::{
    BENEFITS, BLOG_TEASERS, Benefit, BlogTeaser, Brand, CONTACT, ContactInfo, FEATURED_BRANDS,
    PROMISES,
};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::state::AppState;

/// Base URL for the "Get Directions" link.
const MAPS_SEARCH_URL: &str = "https://maps.google.com/?q=";

/// Locator query string.
#[derive(Debug, Default, Deserialize)]
pub struct LocatorQuery {
    /// City, state, or zip code typed by the visitor.
    pub q: Option<String>,
}

/// A store as shown in the locator results.
#[derive(Debug, Clone)]
pub struct StoreCard {
    pub name: String,
    pub address: String,
    /// `City, ST 12345`
    pub locality: String,
    pub phone: Option<String>,
    pub hours: Option<String>,
    pub directions_url: String,
}

impl From<&StoreRecord> for StoreCard {
    fn from(store: &StoreRecord) -> Self {
        Self {
            name: store.name.clone(),
            address: store.address.clone(),
            locality: format!("{}, {} {}", store.city, store.state, store.zip_code),
            phone: store.phone.clone(),
            hours: store.hours.clone(),
            directions_url: directions_url(store),
        }
    }
}

/// Maps search link for the store's full address.
#[must_use]
pub fn directions_url(store: &StoreRecord) -> String {
    format!(
        "{MAPS_SEARCH_URL}{}",
        urlencoding::encode(&store.full_address())
    )
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub signed_in: bool,
    pub show_admin: bool,
    pub user_email: Option<String>,
    /// The query as typed, echoed back into the search box.
    pub query: String,
    pub searched: bool,
    pub summary: Option<String>,
    pub results: Vec<StoreCard>,
    pub directory_empty: bool,
    pub brands: &'static [Brand],
    pub benefits: &'static [Benefit],
    pub promises: &'static [&'static str],
    pub blog_teasers: &'static [BlogTeaser],
    pub contact: ContactInfo,
}

/// Display the home page, running the locator search when `q` is present.
#[instrument(skip_all, fields(q = query.q.as_deref().unwrap_or_default()))]
pub async fn home(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<LocatorQuery>,
) -> HomeTemplate {
    state.directory().refresh_or_keep().await;
    let directory = state.directory().snapshot().await;

    let raw_query = query.q.unwrap_or_default();
    let outcome = search_stores(directory.stores(), &raw_query, state.config().search_mode);
    let access = state
        .config()
        .admin_policy
        .access(user.as_ref().map(|u| &u.identity));

    if outcome.has_searched() {
        tracing::debug!(matches = outcome.matches().len(), "Locator search");
    }

    HomeTemplate {
        signed_in: user.is_some(),
        show_admin: access.shows_admin_controls(),
        user_email: user.map(|u| u.email().to_string()),
        query: raw_query.trim().to_string(),
        searched: outcome.has_searched(),
        summary: outcome.summary(),
        results: outcome.matches().iter().map(|s| StoreCard::from(*s)).collect(),
        directory_empty: directory.is_empty(),
        brands: FEATURED_BRANDS,
        benefits: BENEFITS,
        promises: PROMISES,
        blog_teasers: BLOG_TEASERS,
        contact: CONTACT,
    }
}

#[cfg(test)]
mod tests {
    use mattress_locator_core::StoreId;

    use super::*;

    fn store(phone: Option<&str>) -> StoreRecord {
        StoreRecord {
            id: StoreId::random(),
            name: "Mattress Liquidators Downtown".to_string(),
            address: "123 Main St".to_string(),
            city: "Los Angeles".to_string(),
            state: "CA".to_string(),
            zip_code: "90210".to_string(),
            phone: phone.map(str::to_string),
            hours: None,
            created_at: None,
            created_by: None,
        }
    }

    #[test]
    fn test_directions_url_encodes_full_address() {
        assert_eq!(
            directions_url(&store(None)),
            "https://maps.google.com/?q=123%20Main%20St%2C%20Los%20Angeles%2C%20CA%2090210"
        );
    }

    #[test]
    fn test_store_card_fields() {
        let card = StoreCard::from(&store(Some("(555) 123-4567")));
        assert_eq!(card.locality, "Los Angeles, CA 90210");
        assert_eq!(card.phone.as_deref(), Some("(555) 123-4567"));
        assert!(card.directions_url.starts_with("https://maps.google.com/?q=123%20Main"));
    }
}
