//! Catalog filter pipeline
//!
//! The pipeline runs over a collection that is already restricted to
//! published items:
//! - level scope is decided at fetch time through `FetchRequest`
//! - category and free-text search are applied locally by `apply`
//! - `ListingProfile` carries each domain's ordering rules and page size

use serde::{Deserialize, Serialize};

use super::text::plain_text;
use super::CatalogError;
use crate::config::CatalogConfig;
use crate::models::{
    Category, CategoryFilter, ContentDomain, ContentItem, FilterCriteria, Identity, LevelMode,
};

/// Shape of the collection requested from the repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "level_id")]
pub enum FetchRequest {
    All,
    ByLevel(i64),
}

impl FetchRequest {
    /// Level scoping only applies when the identity actually has a level
    pub fn for_identity(mode: LevelMode, identity: &Identity) -> Self {
        match (mode, identity.level_id) {
            (LevelMode::ByUserLevel, Some(level_id)) => FetchRequest::ByLevel(level_id),
            _ => FetchRequest::All,
        }
    }

    /// Cache key suffix for this shape
    pub fn cache_key(&self) -> String {
        match self {
            FetchRequest::All => "all".to_string(),
            FetchRequest::ByLevel(level_id) => format!("level:{}", level_id),
        }
    }
}

/// Sort applied at one stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Keep repository order
    Repository,
    IdDesc,
    DateDesc,
}

impl SortOrder {
    /// Stable sort in place
    pub fn sort(&self, items: &mut [ContentItem]) {
        match self {
            SortOrder::Repository => {}
            SortOrder::IdDesc => items.sort_by(|a, b| b.id.cmp(&a.id)),
            SortOrder::DateDesc => items.sort_by(|a, b| b.date.cmp(&a.date)),
        }
    }
}

/// Per-domain listing rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingProfile {
    pub domain: ContentDomain,
    pub page_size: u32,
    /// Applied to the fetched collection before filtering
    pub fetch_order: SortOrder,
    /// Applied to the filtered sequence
    pub result_order: SortOrder,
    pub anonymous_limit: usize,
    pub highlight_limit: usize,
}

impl ListingProfile {
    pub fn for_domain(domain: ContentDomain, config: &CatalogConfig) -> Self {
        let (fetch_order, result_order) = match domain {
            ContentDomain::Courses => (SortOrder::IdDesc, SortOrder::Repository),
            ContentDomain::News => (SortOrder::Repository, SortOrder::DateDesc),
            ContentDomain::Materials => (SortOrder::Repository, SortOrder::Repository),
        };

        Self {
            domain,
            page_size: config.page_sizes.for_domain(domain).max(1),
            fetch_order,
            result_order,
            anonymous_limit: config.anonymous_limit,
            highlight_limit: config.highlight_limit,
        }
    }
}

/// Resolve a category filter against the directory.
///
/// `Ok(None)` means no restriction. Names match case-insensitively after
/// trimming.
pub fn resolve_category(
    filter: &CategoryFilter,
    categories: &[Category],
) -> Result<Option<i64>, CatalogError> {
    match filter {
        CategoryFilter::All => Ok(None),
        CategoryFilter::Id(id) => categories
            .iter()
            .find(|c| c.id == *id)
            .map(|c| Some(c.id))
            .ok_or_else(|| CatalogError::InvalidCriteria(format!("unknown category id {}", id))),
        CategoryFilter::Name(name) => {
            let wanted = name.trim().to_lowercase();
            categories
                .iter()
                .find(|c| c.name.trim().to_lowercase() == wanted)
                .map(|c| Some(c.id))
                .ok_or_else(|| {
                    CatalogError::InvalidCriteria(format!("unknown category name '{}'", name))
                })
        }
    }
}

/// Case-insensitive substring test against the plain-text title or description.
///
/// `term` must already be trimmed and lowercased; an empty term matches everything.
pub fn matches_search(item: &ContentItem, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    plain_text(&item.title).to_lowercase().contains(term)
        || plain_text(&item.description).to_lowercase().contains(term)
}

/// Apply category and search criteria, preserving input order.
///
/// An unresolvable category yields an empty sequence.
pub fn apply(
    items: Vec<ContentItem>,
    criteria: &FilterCriteria,
    categories: &[Category],
) -> Vec<ContentItem> {
    let category_id = match resolve_category(&criteria.category, categories) {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Filtering to empty set: {}", e);
            return Vec::new();
        }
    };
    let term = criteria.search.trim().to_lowercase();

    items
        .into_iter()
        .filter(|item| category_id.map_or(true, |id| item.category_id == id))
        .filter(|item| matches_search(item, &term))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn categories() -> Vec<Category> {
        vec![Category::new(1, "Pedagogía"), Category::new(2, "Matemática")]
    }

    fn items() -> Vec<ContentItem> {
        vec![
            ContentItem::new(1, ContentDomain::Courses, "Ética Docente", 1)
                .with_description("Fundamentos"),
            ContentItem::new(2, ContentDomain::Courses, "Álgebra", 2)
                .with_description("<p>Curso de ética aplicada</p>"),
            ContentItem::new(3, ContentDomain::Courses, "Geometría", 2),
        ]
    }

    #[test]
    fn test_fetch_request_for_identity() {
        let member = Identity::authenticated(Some(4));
        assert_eq!(
            FetchRequest::for_identity(LevelMode::ByUserLevel, &member),
            FetchRequest::ByLevel(4)
        );
        assert_eq!(FetchRequest::for_identity(LevelMode::All, &member), FetchRequest::All);

        let no_level = Identity::authenticated(None);
        assert_eq!(
            FetchRequest::for_identity(LevelMode::ByUserLevel, &no_level),
            FetchRequest::All
        );
        assert_eq!(
            FetchRequest::for_identity(LevelMode::ByUserLevel, &Identity::anonymous()),
            FetchRequest::All
        );
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(FetchRequest::All.cache_key(), "all");
        assert_eq!(FetchRequest::ByLevel(3).cache_key(), "level:3");
    }

    #[test]
    fn test_neutral_criteria_keeps_everything() {
        let out = apply(items(), &FilterCriteria::new(), &categories());
        assert_eq!(out, items());
    }

    #[test]
    fn test_category_by_id_and_name() {
        let by_id = apply(
            items(),
            &FilterCriteria::new().with_category(CategoryFilter::Id(2)),
            &categories(),
        );
        assert_eq!(by_id.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3]);

        let by_name = apply(
            items(),
            &FilterCriteria::new().with_category(CategoryFilter::Name(" matemática ".into())),
            &categories(),
        );
        assert_eq!(by_name, by_id);
    }

    #[test]
    fn test_unknown_category_yields_empty() {
        let unknown_id = FilterCriteria::new().with_category(CategoryFilter::Id(99));
        assert!(apply(items(), &unknown_id, &categories()).is_empty());

        let unknown_name = FilterCriteria::new().with_category(CategoryFilter::Name("Arte".into()));
        assert!(apply(items(), &unknown_name, &categories()).is_empty());

        assert!(matches!(
            resolve_category(&CategoryFilter::Id(99), &categories()),
            Err(CatalogError::InvalidCriteria(_))
        ));
    }

    #[test]
    fn test_search_title_or_description() {
        let criteria = FilterCriteria::new().with_search("ética");
        let out = apply(items(), &criteria, &categories());
        assert_eq!(out.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trimmed() {
        let criteria = FilterCriteria::new().with_search("  GEOMETRÍA ");
        let out = apply(items(), &criteria, &categories());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 3);
    }

    #[test]
    fn test_search_ignores_markup() {
        // Tag names are not searchable text
        let criteria = FilterCriteria::new().with_search("<p>");
        assert!(apply(items(), &criteria, &categories()).is_empty());
    }

    #[test]
    fn test_sort_orders() {
        let mut list = vec![
            ContentItem::new(1, ContentDomain::News, "a", 1)
                .with_date(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ContentItem::new(3, ContentDomain::News, "b", 1)
                .with_date(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()),
            ContentItem::new(2, ContentDomain::News, "c", 1)
                .with_date(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
        ];

        SortOrder::Repository.sort(&mut list);
        assert_eq!(list.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 3, 2]);

        SortOrder::IdDesc.sort(&mut list);
        assert_eq!(list.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3, 2, 1]);

        SortOrder::DateDesc.sort(&mut list);
        assert_eq!(list.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 1, 3]);
    }

    #[test]
    fn test_profiles() {
        let config = CatalogConfig::default();
        let courses = ListingProfile::for_domain(ContentDomain::Courses, &config);
        assert_eq!(courses.page_size, 6);
        assert_eq!(courses.fetch_order, SortOrder::IdDesc);

        let news = ListingProfile::for_domain(ContentDomain::News, &config);
        assert_eq!(news.page_size, 5);
        assert_eq!(news.result_order, SortOrder::DateDesc);

        let materials = ListingProfile::for_domain(ContentDomain::Materials, &config);
        assert_eq!(materials.fetch_order, SortOrder::Repository);
        assert_eq!(materials.result_order, SortOrder::Repository);
        assert_eq!(materials.anonymous_limit, 3);
        assert_eq!(materials.highlight_limit, 5);
    }
}
