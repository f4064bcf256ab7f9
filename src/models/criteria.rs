//! Listing filter criteria
//!
//! `FilterCriteria` is owned by one listing instance and describes which slice
//! of a collection the caller is looking at.

use serde::{Deserialize, Serialize};

/// Category selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    /// No category restriction
    #[default]
    All,
    /// A category referenced by id
    Id(i64),
    /// A category referenced by its display name
    Name(String),
}

impl CategoryFilter {
    /// Parse a query-string value.
    ///
    /// Empty values and `all` (any case) select every category, digits select
    /// by id, anything else selects by name.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return CategoryFilter::All;
        }
        match raw.parse::<i64>() {
            Ok(id) => CategoryFilter::Id(id),
            Err(_) => CategoryFilter::Name(raw.to_string()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

/// How the source collection is scoped by audience level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelMode {
    /// Every level
    #[default]
    All,
    /// Only the level of the current identity (when it has one)
    ByUserLevel,
}

impl LevelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelMode::All => "all",
            LevelMode::ByUserLevel => "by_user_level",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "all" => Some(LevelMode::All),
            "by_user_level" => Some(LevelMode::ByUserLevel),
            _ => None,
        }
    }
}

/// Criteria applied by the filter pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FilterCriteria {
    #[serde(default)]
    pub category: CategoryFilter,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub level_mode: LevelMode,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_level_mode(mut self, level_mode: LevelMode) -> Self {
        self.level_mode = level_mode;
        self
    }

    /// Whether the category and search criteria are both at their neutral value
    pub fn is_neutral(&self) -> bool {
        self.category.is_all() && self.search.trim().is_empty()
    }
}
