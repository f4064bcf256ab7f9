//! Directory service
//!
//! Cached access to categories and levels, and id → display name resolution
//! with configured fallbacks for dangling references.

use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{Cache, CacheLayer};
use crate::config::CatalogConfig;
use crate::db::repositories::DirectoryRepository;
use crate::models::{category_name, level_name, Category, Level};

const CACHE_KEY_CATEGORIES: &str = "directory:categories";
const CACHE_KEY_LEVELS: &str = "directory:levels";
const CACHE_PATTERN_DIRECTORY: &str = "directory:*";

#[derive(Debug, Error)]
pub enum DirectoryServiceError {
    #[error("Name already exists: {0}")]
    DuplicateName(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Both directories plus the fallback names
#[derive(Debug, Clone, Serialize)]
pub struct DirectoryNames {
    pub categories: Vec<Category>,
    pub levels: Vec<Level>,
    #[serde(skip)]
    default_category: String,
    #[serde(skip)]
    default_level: String,
}

impl DirectoryNames {
    pub fn category(&self, id: i64) -> &str {
        category_name(&self.categories, id, &self.default_category)
    }

    pub fn level(&self, id: Option<i64>) -> &str {
        level_name(&self.levels, id, &self.default_level)
    }
}

pub struct DirectoryService {
    repo: Arc<dyn DirectoryRepository>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
    default_category_name: String,
    default_level_name: String,
}

impl DirectoryService {
    pub fn new(repo: Arc<dyn DirectoryRepository>, cache: Arc<Cache>, config: &CatalogConfig) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
            default_category_name: config.default_category_name.clone(),
            default_level_name: config.default_level_name.clone(),
        }
    }

    pub async fn categories(&self) -> anyhow::Result<Vec<Category>> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Category>>(CACHE_KEY_CATEGORIES).await {
            return Ok(cached);
        }

        let categories = self
            .repo
            .list_categories()
            .await
            .context("Failed to list categories")?;
        let _ = self.cache.set(CACHE_KEY_CATEGORIES, &categories, self.cache_ttl).await;

        Ok(categories)
    }

    pub async fn levels(&self) -> anyhow::Result<Vec<Level>> {
        if let Ok(Some(cached)) = self.cache.get::<Vec<Level>>(CACHE_KEY_LEVELS).await {
            return Ok(cached);
        }

        let levels = self.repo.list_levels().await.context("Failed to list levels")?;
        let _ = self.cache.set(CACHE_KEY_LEVELS, &levels, self.cache_ttl).await;

        Ok(levels)
    }

    /// Load both directories for name resolution
    pub async fn names(&self) -> anyhow::Result<DirectoryNames> {
        let (categories, levels) = tokio::try_join!(self.categories(), self.levels())?;
        Ok(DirectoryNames {
            categories,
            levels,
            default_category: self.default_category_name.clone(),
            default_level: self.default_level_name.clone(),
        })
    }

    pub async fn create_category(&self, name: &str) -> Result<Category, DirectoryServiceError> {
        let name = validate_name(name)?;
        if self
            .categories()
            .await?
            .iter()
            .any(|c| same_name(&c.name, name))
        {
            return Err(DirectoryServiceError::DuplicateName(name.to_string()));
        }

        let category = self.repo.create_category(name).await?;
        self.invalidate_cache().await;
        tracing::info!("Created category {} ({})", category.name, category.id);
        Ok(category)
    }

    pub async fn create_level(&self, name: &str) -> Result<Level, DirectoryServiceError> {
        let name = validate_name(name)?;
        if self
            .levels()
            .await?
            .iter()
            .any(|l| same_name(&l.name, name))
        {
            return Err(DirectoryServiceError::DuplicateName(name.to_string()));
        }

        let level = self.repo.create_level(name).await?;
        self.invalidate_cache().await;
        tracing::info!("Created level {} ({})", level.name, level.id);
        Ok(level)
    }

    async fn invalidate_cache(&self) {
        if let Err(e) = self.cache.delete_pattern(CACHE_PATTERN_DIRECTORY).await {
            tracing::warn!("Failed to invalidate directory cache: {}", e);
        }
    }
}

/// Names compare like category filters resolve: trimmed, case-insensitive
fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<&str, DirectoryServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DirectoryServiceError::ValidationError(
            "Name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > 100 {
        return Err(DirectoryServiceError::ValidationError(
            "Name cannot exceed 100 characters".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_cache;
    use crate::config::CacheConfig;
    use crate::db::repositories::SqlxDirectoryRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> DirectoryService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        DirectoryService::new(
            SqlxDirectoryRepository::boxed(pool),
            create_cache(&CacheConfig::default()),
            &CatalogConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_invalidates_cache() {
        let service = setup_service().await;
        assert!(service.categories().await.unwrap().is_empty());

        service.create_category("Pedagogía").await.unwrap();
        let categories = service.categories().await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Pedagogía");
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_names() {
        let service = setup_service().await;
        service.create_level("Inicial").await.unwrap();

        assert!(matches!(
            service.create_level("inicial").await,
            Err(DirectoryServiceError::DuplicateName(_))
        ));
        assert!(matches!(
            service.create_category("  ").await,
            Err(DirectoryServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_names_fall_back_to_defaults() {
        let service = setup_service().await;
        let category = service.create_category("Arte").await.unwrap();
        let level = service.create_level("Primaria").await.unwrap();

        let names = service.names().await.unwrap();
        assert_eq!(names.category(category.id), "Arte");
        assert_eq!(names.category(999), "General");
        assert_eq!(names.level(Some(level.id)), "Primaria");
        assert_eq!(names.level(Some(999)), "Nivel");
        assert_eq!(names.level(None), "Nivel");
    }
}
