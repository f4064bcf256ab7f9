//! Common API utilities and shared types

use serde::{Deserialize, Serialize};

use crate::api::middleware::ApiError;
use crate::catalog::encode_slug;
use crate::models::{CategoryFilter, ContentDomain, ContentItem, FilterCriteria, LevelMode};
use crate::services::DirectoryNames;

/// Default page number (1-indexed)
pub fn default_page() -> u32 {
    1
}

/// Listing query parameters
///
/// Page size is fixed per domain and deliberately absent here.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub level_mode: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
}

impl ListingQuery {
    pub fn criteria(&self) -> Result<FilterCriteria, ApiError> {
        let level_mode = match self.level_mode.as_deref() {
            None => LevelMode::All,
            Some(raw) => LevelMode::from_str(raw).ok_or_else(|| {
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Unknown level mode: {}", raw),
                    serde_json::json!({ "field": "level_mode", "allowed": ["all", "by_user_level"] }),
                )
            })?,
        };

        Ok(FilterCriteria::new()
            .with_category(
                self.category
                    .as_deref()
                    .map(CategoryFilter::parse)
                    .unwrap_or_default(),
            )
            .with_search(self.search.clone().unwrap_or_default())
            .with_level_mode(level_mode))
    }
}

/// Parse the `{domain}` path segment
pub fn parse_domain(raw: &str) -> Result<ContentDomain, ApiError> {
    ContentDomain::from_str(raw).ok_or_else(|| ApiError::not_found(format!("Unknown catalog: {}", raw)))
}

/// Item as presented to clients, with its slug and resolved directory names
#[derive(Debug, Serialize, Deserialize)]
pub struct ContentItemResponse {
    pub id: i64,
    pub slug: String,
    pub domain: String,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_id: Option<i64>,
    pub level: String,
    pub date: String,
    pub featured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl ContentItemResponse {
    pub fn new(item: ContentItem, names: &DirectoryNames) -> Self {
        Self {
            slug: encode_slug(&item.title, Some(item.id)),
            domain: item.domain.to_string(),
            category: names.category(item.category_id).to_string(),
            level: names.level(item.level_id).to_string(),
            date: item.date.to_rfc3339(),
            id: item.id,
            title: item.title,
            description: item.description,
            category_id: item.category_id,
            level_id: item.level_id,
            featured: item.featured,
            price: item.price,
        }
    }
}
