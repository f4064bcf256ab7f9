//! Catalog service
//!
//! Runs one listing request end to end: picks the domain's profile and
//! content service, builds a fresh `Listing` for the caller, drives it through
//! a `ListingController` and hands back the presentation snapshot.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::Cache;
use crate::catalog::{
    CatalogError, CatalogSnapshot, ContentSource, FetchRequest, Listing, ListingController,
    ListingProfile, ListingState, ListingView,
};
use crate::config::CatalogConfig;
use crate::db::repositories::{ContentRepository, DirectoryRepository};
use crate::models::{ContentDomain, ContentItem, FilterCriteria, Identity};
use crate::services::{ContentService, DirectoryService};

pub struct CatalogService {
    config: CatalogConfig,
    directory: Arc<DirectoryService>,
    courses: Arc<ContentService>,
    news: Arc<ContentService>,
    materials: Arc<ContentService>,
}

impl CatalogService {
    pub fn new(
        config: CatalogConfig,
        content_repo: Arc<dyn ContentRepository>,
        directory_repo: Arc<dyn DirectoryRepository>,
        cache: Arc<Cache>,
    ) -> Self {
        let directory = Arc::new(DirectoryService::new(directory_repo, cache.clone(), &config));
        let content = |domain| {
            Arc::new(ContentService::new(
                domain,
                content_repo.clone(),
                directory.clone(),
                cache.clone(),
            ))
        };

        Self {
            courses: content(ContentDomain::Courses),
            news: content(ContentDomain::News),
            materials: content(ContentDomain::Materials),
            directory,
            config,
        }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn profile(&self, domain: ContentDomain) -> ListingProfile {
        ListingProfile::for_domain(domain, &self.config)
    }

    pub fn content(&self, domain: ContentDomain) -> &Arc<ContentService> {
        match domain {
            ContentDomain::Courses => &self.courses,
            ContentDomain::News => &self.news,
            ContentDomain::Materials => &self.materials,
        }
    }

    pub fn directory(&self) -> &Arc<DirectoryService> {
        &self.directory
    }

    fn fetch_timeout(&self) -> Option<Duration> {
        self.config.fetch_timeout_ms.map(Duration::from_millis)
    }

    fn controller(
        &self,
        domain: ContentDomain,
        identity: Identity,
        criteria: FilterCriteria,
    ) -> ListingController<Arc<ContentService>> {
        let listing = Listing::with_criteria(self.profile(domain), identity, criteria);
        ListingController::new(self.content(domain).clone(), listing)
            .with_fetch_timeout(self.fetch_timeout())
    }

    /// Listing snapshot for one caller, criteria and page
    ///
    /// Repository failures come back as a view in the `Error` state, not as
    /// an `Err`; the page is clamped to the available range.
    pub async fn listing(
        &self,
        domain: ContentDomain,
        identity: Identity,
        criteria: FilterCriteria,
        page: u32,
    ) -> ListingView {
        let controller = self.controller(domain, identity, criteria);
        controller.refresh().await;
        controller.set_page(page);

        let view = controller.view();
        tracing::debug!(
            "Listed {}: {:?}, {} of {} items on page {}",
            domain,
            view.state,
            view.page.len(),
            view.page.total,
            view.page.page
        );
        view
    }

    /// Gated highlight list for the domain's featured widget
    pub async fn featured(
        &self,
        domain: ContentDomain,
        identity: Identity,
    ) -> Result<Vec<ContentItem>, CatalogError> {
        let controller = self.controller(domain, identity, FilterCriteria::default());
        controller.refresh().await;

        match controller.state() {
            ListingState::Error => {
                let message = controller
                    .view()
                    .error
                    .unwrap_or_else(|| format!("{} catalog unavailable", domain));
                Err(CatalogError::Repository(anyhow::anyhow!(message)))
            }
            _ => Ok(controller.highlights()),
        }
    }

    /// Resolve a detail-page segment within a domain
    pub async fn item(&self, domain: ContentDomain, segment: &str) -> Result<ContentItem, CatalogError> {
        self.content(domain).resolve_slug(segment).await
    }

    /// Fetch a raw snapshot through the same collaborator listings use
    pub async fn snapshot(
        &self,
        domain: ContentDomain,
        request: FetchRequest,
    ) -> Result<CatalogSnapshot, CatalogError> {
        self.content(domain).fetch(request).await
    }
}
