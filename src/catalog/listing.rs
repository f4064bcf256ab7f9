//! Listing state machine
//!
//! A `Listing` owns the criteria, page and request generation of one catalog
//! view. Every change that alters the underlying collection bumps the
//! generation and returns a `FetchTicket`; only the response carrying the
//! latest generation is applied, so a slow early fetch can never overwrite a
//! faster later one.
//!
//! `ListingController` drives a listing against an async `ContentSource`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::filter::{self, FetchRequest, ListingProfile};
use super::gate::VisibilityGate;
use super::highlight::select_highlights;
use super::pagination::Paginator;
use super::CatalogError;
use crate::models::{Category, CategoryFilter, ContentItem, FilterCriteria, Identity, LevelMode, Paginated};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingState {
    Loading,
    Ready,
    Empty,
    Error,
}

/// Generation-stamped fetch handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    request: FetchRequest,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> FetchRequest {
        self.request
    }
}

/// Whether a completed fetch was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Current,
    Stale,
}

/// Result of one repository fetch
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub items: Vec<ContentItem>,
    pub categories: Vec<Category>,
}

/// Presentation snapshot of a listing
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub state: ListingState,
    #[serde(flatten)]
    pub page: Paginated<ContentItem>,
    pub show_pagination: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub struct Listing {
    profile: ListingProfile,
    identity: Identity,
    criteria: FilterCriteria,
    page: u32,
    generation: u64,
    state: ListingState,
    /// Filtered, ordered and gated sequence
    visible: Vec<ContentItem>,
    highlights: Vec<ContentItem>,
    error: Option<String>,
}

impl Listing {
    pub fn new(profile: ListingProfile, identity: Identity) -> Self {
        Self::with_criteria(profile, identity, FilterCriteria::default())
    }

    /// Listing that starts from the given criteria; nothing is fetched yet
    pub fn with_criteria(profile: ListingProfile, identity: Identity, criteria: FilterCriteria) -> Self {
        Self {
            profile,
            identity,
            criteria,
            page: 1,
            generation: 0,
            state: ListingState::Loading,
            visible: Vec::new(),
            highlights: Vec::new(),
            error: None,
        }
    }

    pub fn state(&self) -> ListingState {
        self.state
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn profile(&self) -> &ListingProfile {
        &self.profile
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Gated highlight list derived from the last applied fetch
    pub fn highlights(&self) -> &[ContentItem] {
        &self.highlights
    }

    fn paginator(&self) -> Paginator {
        Paginator::new(self.profile.page_size)
    }

    fn gate(&self) -> VisibilityGate {
        VisibilityGate::new(self.profile.anonymous_limit)
    }

    /// Re-arm loading with the current criteria
    pub fn refresh(&mut self) -> FetchTicket {
        self.generation += 1;
        self.page = 1;
        self.state = ListingState::Loading;
        self.visible.clear();
        self.highlights.clear();
        self.error = None;

        FetchTicket {
            generation: self.generation,
            request: FetchRequest::for_identity(self.criteria.level_mode, &self.identity),
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) -> FetchTicket {
        self.criteria.category = category;
        self.refresh()
    }

    pub fn set_search(&mut self, search: impl Into<String>) -> FetchTicket {
        self.criteria.search = search.into();
        self.refresh()
    }

    /// Switching level scope changes the collection, so category and search reset
    pub fn set_level_mode(&mut self, mode: LevelMode) -> FetchTicket {
        self.criteria = FilterCriteria::new().with_level_mode(mode);
        self.refresh()
    }

    /// Replace the identity; a different level resets category and search
    pub fn set_identity(&mut self, identity: Identity) -> FetchTicket {
        if identity.level_id != self.identity.level_id {
            self.criteria = FilterCriteria::new().with_level_mode(self.criteria.level_mode);
        }
        self.identity = identity;
        self.refresh()
    }

    /// Move to another page of the current sequence; never fetches
    pub fn set_page(&mut self, page: u32) -> u32 {
        self.page = self.paginator().clamp(page, self.visible.len());
        self.page
    }

    /// Apply a fetch outcome if its ticket is still current
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: Result<CatalogSnapshot, CatalogError>,
    ) -> Applied {
        if ticket.generation != self.generation {
            tracing::debug!(
                "Discarding stale {} response (generation {} < {})",
                self.profile.domain,
                ticket.generation,
                self.generation
            );
            return Applied::Stale;
        }

        match outcome {
            Ok(snapshot) => self.apply_snapshot(snapshot),
            Err(e) => {
                tracing::warn!("Failed to load {} listing: {}", self.profile.domain, e);
                self.state = ListingState::Error;
                self.visible.clear();
                self.highlights.clear();
                self.error = Some(e.to_string());
                self.page = 1;
            }
        }

        Applied::Current
    }

    fn apply_snapshot(&mut self, snapshot: CatalogSnapshot) {
        let gate = self.gate();

        let mut eligible: Vec<ContentItem> = snapshot
            .items
            .into_iter()
            .filter(ContentItem::is_published)
            .collect();
        self.profile.fetch_order.sort(&mut eligible);

        self.highlights = gate.apply(
            select_highlights(&eligible, self.profile.highlight_limit),
            &self.identity,
        );

        let mut filtered = filter::apply(eligible, &self.criteria, &snapshot.categories);
        self.profile.result_order.sort(&mut filtered);

        self.visible = gate.apply(filtered, &self.identity);
        self.state = if self.visible.is_empty() {
            ListingState::Empty
        } else {
            ListingState::Ready
        };
        self.error = None;
        self.page = self.paginator().clamp(self.page, self.visible.len());
    }

    pub fn view(&self) -> ListingView {
        let page = self.paginator().page(&self.visible, self.page);
        ListingView {
            state: self.state,
            show_pagination: page.show_pagination(),
            page,
            error: self.error.clone(),
        }
    }
}

/// Async collaborator that produces catalog snapshots
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<CatalogSnapshot, CatalogError>;
}

#[async_trait]
impl<T: ContentSource + ?Sized> ContentSource for std::sync::Arc<T> {
    async fn fetch(&self, request: FetchRequest) -> Result<CatalogSnapshot, CatalogError> {
        (**self).fetch(request).await
    }
}

/// Async driver around a `Listing`
///
/// The lock is only taken to issue tickets and apply outcomes; the fetch
/// itself runs unlocked so overlapping changes race freely and the
/// generation check sorts them out.
pub struct ListingController<S> {
    source: S,
    listing: Mutex<Listing>,
    fetch_timeout: Option<Duration>,
}

impl<S: ContentSource> ListingController<S> {
    pub fn new(source: S, listing: Listing) -> Self {
        Self {
            source,
            listing: Mutex::new(listing),
            fetch_timeout: None,
        }
    }

    /// Treat fetches slower than `timeout` as repository failures
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Listing> {
        self.listing.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub async fn refresh(&self) -> Applied {
        let ticket = self.lock().refresh();
        self.run(ticket).await
    }

    pub async fn set_category(&self, category: CategoryFilter) -> Applied {
        let ticket = self.lock().set_category(category);
        self.run(ticket).await
    }

    pub async fn set_search(&self, search: impl Into<String>) -> Applied {
        let ticket = self.lock().set_search(search);
        self.run(ticket).await
    }

    pub async fn set_level_mode(&self, mode: LevelMode) -> Applied {
        let ticket = self.lock().set_level_mode(mode);
        self.run(ticket).await
    }

    pub async fn set_identity(&self, identity: Identity) -> Applied {
        let ticket = self.lock().set_identity(identity);
        self.run(ticket).await
    }

    pub fn set_page(&self, page: u32) -> u32 {
        self.lock().set_page(page)
    }

    pub fn state(&self) -> ListingState {
        self.lock().state()
    }

    pub fn view(&self) -> ListingView {
        self.lock().view()
    }

    pub fn highlights(&self) -> Vec<ContentItem> {
        self.lock().highlights().to_vec()
    }

    async fn run(&self, ticket: FetchTicket) -> Applied {
        let fetch = self.source.fetch(ticket.request());
        let outcome = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch).await {
                Ok(outcome) => outcome,
                Err(_) => Err(CatalogError::Repository(anyhow::anyhow!(
                    "fetch timed out after {} ms",
                    limit.as_millis()
                ))),
            },
            None => fetch.await,
        };
        self.lock().complete(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::models::{ContentDomain, PublishState};
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    fn profile(domain: ContentDomain) -> ListingProfile {
        ListingProfile::for_domain(domain, &CatalogConfig::default())
    }

    fn courses(count: i64) -> Vec<ContentItem> {
        (1..=count)
            .map(|id| ContentItem::new(id, ContentDomain::Courses, format!("Curso {}", id), 1))
            .collect()
    }

    fn snapshot(items: Vec<ContentItem>) -> CatalogSnapshot {
        CatalogSnapshot {
            items,
            categories: vec![Category::new(1, "General"), Category::new(2, "Arte")],
        }
    }

    #[test]
    fn test_new_listing_is_loading() {
        let listing = Listing::new(profile(ContentDomain::Courses), Identity::anonymous());
        assert_eq!(listing.state(), ListingState::Loading);
        assert_eq!(listing.generation(), 0);
        assert_eq!(listing.page(), 1);
    }

    #[test]
    fn test_ready_and_courses_sorted_by_id_desc() {
        let mut listing = Listing::new(
            profile(ContentDomain::Courses),
            Identity::authenticated(None),
        );
        let ticket = listing.refresh();
        assert_eq!(listing.complete(ticket, Ok(snapshot(courses(4)))), Applied::Current);

        let view = listing.view();
        assert_eq!(view.state, ListingState::Ready);
        assert_eq!(
            view.page.items.iter().map(|i| i.id).collect::<Vec<_>>(),
            vec![4, 3, 2, 1]
        );
        assert!(!view.show_pagination);
    }

    #[test]
    fn test_news_sorted_by_date_after_filter() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let news = vec![
            ContentItem::new(1, ContentDomain::News, "Vieja", 1).with_date(base),
            ContentItem::new(2, ContentDomain::News, "Nueva", 1)
                .with_date(base + ChronoDuration::days(3)),
            ContentItem::new(3, ContentDomain::News, "Media", 2)
                .with_date(base + ChronoDuration::days(1)),
        ];
        let mut listing = Listing::new(profile(ContentDomain::News), Identity::authenticated(None));
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(news)));

        let ids: Vec<_> = listing.view().page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_unpublished_items_never_surface() {
        let mut items = courses(3);
        items[0].state = PublishState::Draft;
        items[1].state = PublishState::Archived;

        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None));
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(items)));

        let ids: Vec<_> = listing.view().page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_empty_state() {
        let mut listing = Listing::new(profile(ContentDomain::Materials), Identity::anonymous());
        let ticket = listing.set_category(CategoryFilter::Id(2));
        listing.complete(ticket, Ok(snapshot(courses(5))));
        assert_eq!(listing.state(), ListingState::Empty);
        assert!(listing.view().page.is_empty());
    }

    #[test]
    fn test_error_state_carries_no_items() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None));
        let first = listing.refresh();
        listing.complete(first, Ok(snapshot(courses(3))));
        assert_eq!(listing.state(), ListingState::Ready);

        let second = listing.set_search("curso");
        let applied = listing.complete(
            second,
            Err(CatalogError::Repository(anyhow::anyhow!("connection reset"))),
        );
        assert_eq!(applied, Applied::Current);

        let view = listing.view();
        assert_eq!(view.state, ListingState::Error);
        assert!(view.page.items.is_empty());
        assert!(listing.highlights().is_empty());
        assert!(view.error.unwrap().contains("connection reset"));
    }

    #[test]
    fn test_anonymous_view_is_capped_and_single_page() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::anonymous());
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(courses(20))));

        let view = listing.view();
        assert_eq!(view.page.total, 3);
        assert_eq!(view.page.items.len(), 3);
        assert!(!view.show_pagination);
        assert!(listing.highlights().len() <= 3);
    }

    #[test]
    fn test_set_page_clamps_without_fetching() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None));
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(courses(14))));

        let generation = listing.generation();
        assert_eq!(listing.set_page(2), 2);
        assert_eq!(listing.set_page(99), 3);
        assert_eq!(listing.set_page(0), 1);
        assert_eq!(listing.generation(), generation);
        assert_eq!(listing.state(), ListingState::Ready);
    }

    #[test]
    fn test_criteria_change_resets_page() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None));
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(courses(14))));
        listing.set_page(3);

        let ticket = listing.set_search("Curso 1");
        assert_eq!(listing.page(), 1);
        assert_eq!(listing.state(), ListingState::Loading);
        listing.complete(ticket, Ok(snapshot(courses(14))));

        // "Curso 1", "Curso 10".."Curso 14" fit on one page of six
        let view = listing.view();
        assert_eq!(view.page.total, 6);
        assert_eq!(view.page.page, 1);
        assert!(!view.show_pagination);
    }

    #[test]
    fn test_level_mode_change_resets_category_and_search() {
        let member = Identity::authenticated(Some(2));
        let mut listing = Listing::with_criteria(
            profile(ContentDomain::Courses),
            member,
            FilterCriteria::new()
                .with_category(CategoryFilter::Id(1))
                .with_search("algo"),
        );

        let ticket = listing.set_level_mode(LevelMode::ByUserLevel);
        assert_eq!(ticket.request(), FetchRequest::ByLevel(2));
        assert!(listing.criteria().is_neutral());
        assert_eq!(listing.criteria().level_mode, LevelMode::ByUserLevel);
    }

    #[test]
    fn test_identity_level_change_resets_criteria() {
        let mut listing = Listing::with_criteria(
            profile(ContentDomain::Courses),
            Identity::authenticated(Some(1)),
            FilterCriteria::new()
                .with_search("algo")
                .with_level_mode(LevelMode::ByUserLevel),
        );

        // Same level keeps the search
        listing.set_identity(Identity::authenticated(Some(1)).with_role("teacher"));
        assert_eq!(listing.criteria().search, "algo");

        let ticket = listing.set_identity(Identity::authenticated(Some(3)));
        assert_eq!(listing.criteria().search, "");
        assert_eq!(listing.criteria().level_mode, LevelMode::ByUserLevel);
        assert_eq!(ticket.request(), FetchRequest::ByLevel(3));
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(Some(7)));

        let a = listing.set_level_mode(LevelMode::All);
        let b = listing.set_level_mode(LevelMode::ByUserLevel);
        assert!(b.generation() > a.generation());

        let level_items: Vec<_> = courses(2).into_iter().map(|i| i.with_level(7)).collect();
        assert_eq!(listing.complete(b, Ok(snapshot(level_items))), Applied::Current);
        assert_eq!(listing.complete(a, Ok(snapshot(courses(9)))), Applied::Stale);

        let view = listing.view();
        assert_eq!(view.state, ListingState::Ready);
        assert_eq!(view.page.total, 2);
        assert!(view.page.items.iter().all(|i| i.level_id == Some(7)));
    }

    #[test]
    fn test_stale_error_is_discarded() {
        let mut listing = Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None));
        let a = listing.refresh();
        let b = listing.refresh();
        listing.complete(b, Ok(snapshot(courses(1))));
        let applied = listing.complete(a, Err(CatalogError::Repository(anyhow::anyhow!("late"))));
        assert_eq!(applied, Applied::Stale);
        assert_eq!(listing.state(), ListingState::Ready);
    }

    #[test]
    fn test_ethics_scenario() {
        let items = vec![
            ContentItem::new(5, ContentDomain::Courses, "Ética Docente", 1),
            ContentItem::new(6, ContentDomain::Courses, "Didáctica", 1)
                .with_description("Incluye un módulo de ética profesional"),
            ContentItem::new(7, ContentDomain::Courses, "Geometría", 1),
        ];
        let mut listing = Listing::with_criteria(
            profile(ContentDomain::Courses),
            Identity::authenticated(None),
            FilterCriteria::new().with_search("ética"),
        );
        let ticket = listing.refresh();
        listing.complete(ticket, Ok(snapshot(items)));

        let ids: Vec<_> = listing.view().page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![6, 5]);
        assert_eq!(super::super::slug::encode_slug("Ética Docente", Some(5)), "tica-docente-5");
    }

    struct DelayedSource;

    #[async_trait]
    impl ContentSource for DelayedSource {
        async fn fetch(&self, request: FetchRequest) -> Result<CatalogSnapshot, CatalogError> {
            match request {
                FetchRequest::All => {
                    tokio::time::sleep(std::time::Duration::from_millis(80)).await;
                    Ok(snapshot(courses(10)))
                }
                FetchRequest::ByLevel(level) => {
                    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                    Ok(snapshot(
                        courses(2).into_iter().map(|i| i.with_level(level)).collect(),
                    ))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_controller_out_of_order_completion() {
        let controller = ListingController::new(
            DelayedSource,
            Listing::new(profile(ContentDomain::Courses), Identity::authenticated(Some(4))),
        );

        let (a, b) = tokio::join!(controller.set_level_mode(LevelMode::All), async {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
            controller.set_level_mode(LevelMode::ByUserLevel).await
        });

        assert_eq!(a, Applied::Stale);
        assert_eq!(b, Applied::Current);

        let view = controller.view();
        assert_eq!(view.state, ListingState::Ready);
        assert_eq!(view.page.total, 2);
        assert!(view.page.items.iter().all(|i| i.level_id == Some(4)));
    }

    #[tokio::test]
    async fn test_controller_timeout_is_error() {
        let controller = ListingController::new(
            DelayedSource,
            Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None)),
        )
        .with_fetch_timeout(Some(std::time::Duration::from_millis(10)));

        assert_eq!(controller.refresh().await, Applied::Current);
        assert_eq!(controller.state(), ListingState::Error);
        assert!(controller.view().error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_controller_set_page() {
        let controller = ListingController::new(
            DelayedSource,
            Listing::new(profile(ContentDomain::Courses), Identity::authenticated(None)),
        );
        controller.refresh().await;
        assert_eq!(controller.set_page(2), 2);
        assert_eq!(controller.view().page.items.len(), 4);
        assert_eq!(controller.highlights().len(), 5);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::config::CatalogConfig;
    use crate::models::ContentDomain;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn only_latest_generation_applies(changes in 1usize..6, winner in 0usize..6) {
            let winner = winner % changes;
            let mut listing = Listing::new(
                ListingProfile::for_domain(ContentDomain::Materials, &CatalogConfig::default()),
                Identity::authenticated(None),
            );
            let tickets: Vec<_> = (0..changes).map(|_| listing.refresh()).collect();

            let applied = listing.complete(tickets[winner], Ok(CatalogSnapshot::default()));
            if winner == changes - 1 {
                prop_assert_eq!(applied, Applied::Current);
                prop_assert_eq!(listing.state(), ListingState::Empty);
            } else {
                prop_assert_eq!(applied, Applied::Stale);
                prop_assert_eq!(listing.state(), ListingState::Loading);
            }
        }
    }
}
