//! Content service
//!
//! One instance per content domain. It is the repository collaborator seen by
//! the catalog engine: it produces `CatalogSnapshot`s for listings, resolves
//! slugs for detail pages and accepts new items from the administrative side.
//!
//! Fetched collections are cached under `content:{domain}:{shape}`; creating
//! an item drops every cached shape of its domain.

use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::cache::{Cache, CacheLayer};
use crate::catalog::{self, CatalogError, CatalogSnapshot, ContentSource, FetchRequest};
use crate::db::repositories::ContentRepository;
use crate::models::{ContentDomain, ContentItem, CreateContentInput};
use crate::services::DirectoryService;

#[derive(Debug, Error)]
pub enum ContentServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct ContentService {
    domain: ContentDomain,
    repo: Arc<dyn ContentRepository>,
    directory: Arc<DirectoryService>,
    cache: Arc<Cache>,
    cache_ttl: Duration,
}

impl ContentService {
    pub fn new(
        domain: ContentDomain,
        repo: Arc<dyn ContentRepository>,
        directory: Arc<DirectoryService>,
        cache: Arc<Cache>,
    ) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            domain,
            repo,
            directory,
            cache,
            cache_ttl,
        }
    }

    pub fn domain(&self) -> ContentDomain {
        self.domain
    }

    fn cache_key(&self, request: FetchRequest) -> String {
        format!("content:{}:{}", self.domain, request.cache_key())
    }

    /// Raw collection for a fetch shape, every publish state included
    pub async fn collection(&self, request: FetchRequest) -> anyhow::Result<Vec<ContentItem>> {
        let cache_key = self.cache_key(request);
        if let Ok(Some(cached)) = self.cache.get::<Vec<ContentItem>>(&cache_key).await {
            return Ok(cached);
        }

        let items = match request {
            FetchRequest::All => self.repo.list_all(self.domain).await,
            FetchRequest::ByLevel(level_id) => self.repo.list_by_level(self.domain, level_id).await,
        }
        .with_context(|| format!("Failed to fetch {} collection", self.domain))?;

        let _ = self.cache.set(&cache_key, &items, self.cache_ttl).await;
        Ok(items)
    }

    /// Published items of the whole domain
    pub async fn published(&self) -> anyhow::Result<Vec<ContentItem>> {
        let mut items = self.collection(FetchRequest::All).await?;
        items.retain(ContentItem::is_published);
        Ok(items)
    }

    /// Resolve a detail-page path segment to a published item.
    ///
    /// The id hint is tried with a direct lookup first; when it misses, the
    /// published collection is scanned by recomputed slug.
    pub async fn resolve_slug(&self, segment: &str) -> Result<ContentItem, CatalogError> {
        if let Some(id) = catalog::decode_id(segment) {
            let hinted = self
                .repo
                .get_by_id(self.domain, id)
                .await
                .with_context(|| format!("Failed to get {} item {}", self.domain, id))?;
            if let Some(item) = hinted.filter(ContentItem::is_published) {
                return Ok(item);
            }
        }

        let items = self.published().await?;
        catalog::slug::resolve(&items, segment).cloned()
    }

    pub async fn create(&self, input: &CreateContentInput) -> Result<ContentItem, ContentServiceError> {
        if input.domain != self.domain {
            return Err(ContentServiceError::ValidationError(format!(
                "Item belongs to {}, not {}",
                input.domain, self.domain
            )));
        }
        input.validate().map_err(ContentServiceError::ValidationError)?;

        let item = self.repo.create(input).await?;
        self.invalidate_cache().await;

        tracing::info!(
            "Created {} item {} ({})",
            self.domain,
            item.id,
            catalog::encode_slug(&item.title, Some(item.id))
        );
        Ok(item)
    }

    pub async fn invalidate_cache(&self) {
        let pattern = format!("content:{}:*", self.domain);
        if let Err(e) = self.cache.delete_pattern(&pattern).await {
            tracing::warn!("Failed to invalidate {} cache: {}", self.domain, e);
        }
    }
}

#[async_trait]
impl ContentSource for ContentService {
    async fn fetch(&self, request: FetchRequest) -> Result<CatalogSnapshot, CatalogError> {
        let (items, categories) =
            tokio::try_join!(self.collection(request), self.directory.categories())?;
        Ok(CatalogSnapshot { items, categories })
    }
}
