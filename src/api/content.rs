//! Catalog API endpoints
//!
//! Handles read-only HTTP requests for the three content domains:
//! - GET /api/v1/{domain} - Filtered, gated and paginated listing
//! - GET /api/v1/{domain}/featured - Featured widget
//! - GET /api/v1/{domain}/{slug} - Item detail resolved by slug

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::common::{parse_domain, ContentItemResponse, ListingQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::catalog::{ListingState, ListingView};
use crate::models::{ContentItem, Identity};
use crate::services::DirectoryNames;

/// Response for a catalog listing
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub state: ListingState,
    pub items: Vec<ContentItemResponse>,
    pub total: usize,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub show_pagination: bool,
    pub has_next: bool,
    pub has_prev: bool,
}

impl ListingResponse {
    fn new(view: ListingView, names: &DirectoryNames) -> Self {
        let page = view.page.map(|item| ContentItemResponse::new(item, names));
        Self {
            state: view.state,
            has_next: page.has_next(),
            has_prev: page.has_prev(),
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
            show_pagination: view.show_pagination,
            items: page.items,
        }
    }
}

/// Response for the featured widget
#[derive(Debug, Serialize, Deserialize)]
pub struct FeaturedResponse {
    pub items: Vec<ContentItemResponse>,
}

/// Build the catalog router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{domain}", get(list_catalog))
        .route("/{domain}/featured", get(get_featured))
        .route("/{domain}/{slug}", get(get_item))
}

async fn directory_names(state: &AppState) -> Result<DirectoryNames, ApiError> {
    state.catalog.directory().names().await.map_err(|e| {
        tracing::warn!("Failed to load directories: {:#}", e);
        ApiError::catalog_unavailable("Catalog is temporarily unavailable")
    })
}

fn present(items: Vec<ContentItem>, names: &DirectoryNames) -> Vec<ContentItemResponse> {
    items
        .into_iter()
        .map(|item| ContentItemResponse::new(item, names))
        .collect()
}

/// GET /api/v1/{domain}
pub async fn list_catalog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(domain): Path<String>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ListingResponse>, ApiError> {
    let domain = parse_domain(&domain)?;
    let criteria = query.criteria()?;

    let view = state
        .catalog
        .listing(domain, identity, criteria, query.page)
        .await;

    if view.state == ListingState::Error {
        let message = view
            .error
            .unwrap_or_else(|| "Catalog is temporarily unavailable".to_string());
        return Err(ApiError::catalog_unavailable(message));
    }

    let names = directory_names(&state).await?;
    Ok(Json(ListingResponse::new(view, &names)))
}

/// GET /api/v1/{domain}/featured
pub async fn get_featured(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(domain): Path<String>,
) -> Result<Json<FeaturedResponse>, ApiError> {
    let domain = parse_domain(&domain)?;
    let items = state.catalog.featured(domain, identity).await?;

    let names = directory_names(&state).await?;
    Ok(Json(FeaturedResponse {
        items: present(items, &names),
    }))
}

/// GET /api/v1/{domain}/{slug}
///
/// Only published items resolve; the visibility cap does not apply to
/// direct links.
pub async fn get_item(
    State(state): State<AppState>,
    Path((domain, slug)): Path<(String, String)>,
) -> Result<Json<ContentItemResponse>, ApiError> {
    let domain = parse_domain(&domain)?;
    let item = state.catalog.item(domain, &slug).await?;

    let names = directory_names(&state).await?;
    Ok(Json(ContentItemResponse::new(item, &names)))
}
