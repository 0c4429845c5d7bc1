//! Admin panel route handlers.
//!
//! Every handler requires [`RequireManager`]. Validation failures and backend
//! errors re-render the panel with the submitted values and a blocking alert;
//! successful mutations redirect back to the panel.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use mattress_locator_core::{Identity, StoreDraft, StoreId, StoreRecord};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireManager;
use crate::state::AppState;

const ADD_FAILED: &str = "Error adding store. Please try again.";
const UPDATE_FAILED: &str = "Error updating store. Please try again.";
const REMOVE_FAILED: &str = "Error removing store. Please try again.";

// =============================================================================
// Query Types
// =============================================================================

/// Outcome of the previous mutation, shown once after the redirect.
#[derive(Debug, Deserialize)]
pub struct PanelQuery {
    pub saved: Option<String>,
}

impl PanelQuery {
    fn notice(&self) -> Option<&'static str> {
        match self.saved.as_deref()? {
            "created" => Some("Store added successfully!"),
            "updated" => Some("Store updated successfully!"),
            "deleted" => Some("Store removed successfully!"),
            _ => None,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// A store row in the admin list.
#[derive(Debug, Clone)]
pub struct AdminRow {
    pub id: String,
    pub name: String,
    /// `address, city, state zip`
    pub full_address: String,
    pub phone: Option<String>,
    pub hours: Option<String>,
    /// Inline edit form values when this row is being edited.
    pub edit: Option<StoreDraft>,
}

impl AdminRow {
    fn new(store: &StoreRecord, edit: Option<StoreDraft>) -> Self {
        Self {
            id: store.id.to_string(),
            name: store.name.clone(),
            full_address: store.full_address(),
            phone: store.phone.clone(),
            hours: store.hours.clone(),
            edit,
        }
    }
}

/// Admin panel template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct AdminPanelTemplate {
    pub user_email: String,
    pub rows: Vec<AdminRow>,
    /// `Current Stores (N)` heading.
    pub heading: String,
    /// Values for the "Add New Store" form.
    pub new_store: StoreDraft,
    /// Blocking alert raised by the last submission.
    pub alert: Option<String>,
    pub notice: Option<&'static str>,
}

/// What the panel should show besides the store list.
#[derive(Default)]
struct PanelView {
    new_store: StoreDraft,
    editing: Option<(StoreId, StoreDraft)>,
    alert: Option<String>,
    notice: Option<&'static str>,
}

/// Render the panel over the current directory snapshot.
async fn render_panel(state: &AppState, identity: &Identity, view: PanelView) -> AdminPanelTemplate {
    let directory = state.directory().snapshot().await;
    let policy = &state.config().admin_policy;
    let mut editing = view.editing;

    let rows: Vec<AdminRow> = policy
        .manageable(identity, directory.stores())
        .map(|store| {
            let edit = match editing.take() {
                Some((id, draft)) if id == store.id => Some(draft),
                other => {
                    editing = other;
                    None
                }
            };
            AdminRow::new(store, edit)
        })
        .collect();

    AdminPanelTemplate {
        user_email: identity.email.to_string(),
        heading: format!("Current Stores ({})", rows.len()),
        rows,
        new_store: view.new_store,
        alert: view.alert,
        notice: view.notice,
    }
}

/// Look up a store the user may manage.
///
/// A store missing from the local copy triggers a re-fetch; if that fails the
/// backend error is returned as is.
async fn managed_store(state: &AppState, identity: &Identity, id: StoreId) -> Result<StoreRecord> {
    let store = match state.directory().get(id).await {
        Some(store) => store,
        None => {
            state.directory().refresh().await?;
            state
                .directory()
                .get(id)
                .await
                .ok_or_else(|| AppError::NotFound(format!("store {id}")))?
        }
    };

    if !state.config().admin_policy.can_manage(identity, &store) {
        tracing::warn!(store_id = %id, user_id = %identity.user_id, "Store not manageable by user");
        return Err(AppError::Forbidden(
            "You can only manage your own store listings".to_string(),
        ));
    }
    Ok(store)
}

// =============================================================================
// Routes
// =============================================================================

/// Display the admin panel.
#[instrument(skip_all, fields(user_id = %user.user_id()))]
pub async fn panel(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Query(query): Query<PanelQuery>,
) -> AdminPanelTemplate {
    state.directory().refresh_or_keep().await;
    let view = PanelView {
        notice: query.notice(),
        ..PanelView::default()
    };
    render_panel(&state, &user.identity, view).await
}

/// Create a store from the "Add New Store" form.
#[instrument(skip_all, fields(user_id = %user.user_id()))]
pub async fn create_store(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Form(draft): Form<StoreDraft>,
) -> Response {
    let fields = match draft.validate() {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected incomplete store form");
            let view = PanelView {
                new_store: draft,
                alert: Some(e.to_string()),
                ..PanelView::default()
            };
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                render_panel(&state, &user.identity, view).await,
            )
                .into_response();
        }
    };

    match state
        .directory()
        .create(&user.access_token, fields, user.user_id())
        .await
    {
        Ok(store) => {
            let store_id = store.id.to_string();
            add_breadcrumb("admin", "Added store", Some(&[("store_id", store_id.as_str())]));
            tracing::info!(store_id = %store.id, "Store added");
            Redirect::to("/admin?saved=created").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Error adding store");
            let view = PanelView {
                new_store: draft,
                alert: Some(ADD_FAILED.to_string()),
                ..PanelView::default()
            };
            (
                StatusCode::BAD_GATEWAY,
                render_panel(&state, &user.identity, view).await,
            )
                .into_response()
        }
    }
}

/// Display the panel with one store in inline edit mode.
#[instrument(skip_all, fields(user_id = %user.user_id(), store_id = %id))]
pub async fn edit_store(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<StoreId>,
) -> Result<AdminPanelTemplate> {
    let store = managed_store(&state, &user.identity, id).await?;
    let view = PanelView {
        editing: Some((id, StoreDraft::from(&store))),
        ..PanelView::default()
    };
    Ok(render_panel(&state, &user.identity, view).await)
}

/// Save an inline edit.
#[instrument(skip_all, fields(user_id = %user.user_id(), store_id = %id))]
pub async fn update_store(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<StoreId>,
    Form(draft): Form<StoreDraft>,
) -> Result<Response> {
    managed_store(&state, &user.identity, id).await?;

    let fields = match draft.validate() {
        Ok(fields) => fields,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected incomplete store edit");
            let view = PanelView {
                editing: Some((id, draft)),
                alert: Some(e.to_string()),
                ..PanelView::default()
            };
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_panel(&state, &user.identity, view).await,
            )
                .into_response());
        }
    };

    match state
        .directory()
        .update(&user.access_token, id, &fields)
        .await
    {
        Ok(_) => {
            let store_id = id.to_string();
            add_breadcrumb("admin", "Updated store", Some(&[("store_id", store_id.as_str())]));
            tracing::info!("Store updated");
            Ok(Redirect::to("/admin?saved=updated").into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Error updating store");
            let view = PanelView {
                editing: Some((id, draft)),
                alert: Some(UPDATE_FAILED.to_string()),
                ..PanelView::default()
            };
            Ok((
                StatusCode::BAD_GATEWAY,
                render_panel(&state, &user.identity, view).await,
            )
                .into_response())
        }
    }
}

/// Delete a store.
#[instrument(skip_all, fields(user_id = %user.user_id(), store_id = %id))]
pub async fn delete_store(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<StoreId>,
) -> Result<Response> {
    managed_store(&state, &user.identity, id).await?;

    match state.directory().delete(&user.access_token, id).await {
        Ok(()) => {
            let store_id = id.to_string();
            add_breadcrumb("admin", "Removed store", Some(&[("store_id", store_id.as_str())]));
            tracing::info!("Store removed");
            Ok(Redirect::to("/admin?saved=deleted").into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "Error removing store");
            let view = PanelView {
                alert: Some(REMOVE_FAILED.to_string()),
                ..PanelView::default()
            };
            Ok((
                StatusCode::BAD_GATEWAY,
                render_panel(&state, &user.identity, view).await,
            )
                .into_response())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_notice() {
        let query = PanelQuery {
            saved: Some("created".to_string()),
        };
        assert_eq!(query.notice(), Some("Store added successfully!"));

        let query = PanelQuery {
            saved: Some("<script>".to_string()),
        };
        assert_eq!(query.notice(), None);

        let query = PanelQuery { saved: None };
        assert_eq!(query.notice(), None);
    }
}
