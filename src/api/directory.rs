//! Directory API endpoints
//!
//! - GET /api/v1/categories - List categories
//! - GET /api/v1/levels - List audience levels
//! - GET /api/v1/health - Database ping

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Category, Level};

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelListResponse {
    pub levels: Vec<Level>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<CategoryListResponse>, ApiError> {
    let categories = state
        .catalog
        .directory()
        .categories()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(CategoryListResponse { categories }))
}

/// GET /api/v1/levels
pub async fn list_levels(State(state): State<AppState>) -> Result<Json<LevelListResponse>, ApiError> {
    let levels = state
        .catalog
        .directory()
        .levels()
        .await
        .map_err(|e| ApiError::internal_error(e.to_string()))?;

    Ok(Json(LevelListResponse { levels }))
}

/// GET /api/v1/health
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = format!("{:?}", state.pool.driver()).to_lowercase();
    match state.pool.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                database,
            }),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    database,
                }),
            )
        }
    }
}
