//! Content item model
//!
//! This module provides:
//! - `ContentItem`, the domain-agnostic shape shared by courses, news and materials
//! - `ContentDomain` naming which of the three collections an item belongs to
//! - `PublishState` gating catalog eligibility
//! - `CreateContentInput` used by the administrative collaborator and test seeding

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single catalog entry (course, news article or downloadable material)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Unique identifier within its domain
    pub id: i64,
    /// Which collection the item belongs to
    pub domain: ContentDomain,
    /// Title, may contain inline markup
    pub title: String,
    /// Rich-text description
    #[serde(default)]
    pub description: String,
    /// Category reference
    pub category_id: i64,
    /// Audience level reference
    #[serde(default)]
    pub level_id: Option<i64>,
    /// Publication state
    pub state: PublishState,
    /// Publication or event date
    pub date: DateTime<Utc>,
    /// Explicit curation flag
    #[serde(default)]
    pub featured: bool,
    /// Price for paid courses and materials
    #[serde(default)]
    pub price: Option<f64>,
}

impl ContentItem {
    /// Create a published item with the given identity and title.
    ///
    /// Remaining fields take neutral values; use the `with_*` helpers to set them.
    pub fn new(id: i64, domain: ContentDomain, title: impl Into<String>, category_id: i64) -> Self {
        Self {
            id,
            domain,
            title: title.into(),
            description: String::new(),
            category_id,
            level_id: None,
            state: PublishState::Published,
            date: Utc::now(),
            featured: false,
            price: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level_id: i64) -> Self {
        self.level_id = Some(level_id);
        self
    }

    pub fn with_state(mut self, state: PublishState) -> Self {
        self.state = state;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = date;
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Whether the item may appear in any catalog output
    pub fn is_published(&self) -> bool {
        self.state == PublishState::Published
    }
}

/// The three parallel content collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentDomain {
    Courses,
    News,
    Materials,
}

impl ContentDomain {
    /// All domains, in navigation order
    pub const ALL: [ContentDomain; 3] = [
        ContentDomain::Courses,
        ContentDomain::News,
        ContentDomain::Materials,
    ];

    /// Convert domain to its database and URL representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentDomain::Courses => "courses",
            ContentDomain::News => "news",
            ContentDomain::Materials => "materials",
        }
    }

    /// Parse domain from its database or URL representation
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "courses" => Some(ContentDomain::Courses),
            "news" => Some(ContentDomain::News),
            "materials" => Some(ContentDomain::Materials),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContentDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Content publication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishState {
    /// Draft - not visible to public
    #[default]
    Draft,
    /// Published - eligible for catalog output
    Published,
    /// Archived - hidden but not deleted
    Archived,
    /// Any stored value this build does not recognise; never eligible
    #[serde(other)]
    Unknown,
}

impl PublishState {
    /// Convert state to database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishState::Draft => "draft",
            PublishState::Published => "published",
            PublishState::Archived => "archived",
            PublishState::Unknown => "unknown",
        }
    }

    /// Parse state from database string representation
    ///
    /// Returns `None` for unrecognised values; see `from_stored` for the
    /// lenient form used when reading rows.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(PublishState::Draft),
            "published" => Some(PublishState::Published),
            "archived" => Some(PublishState::Archived),
            _ => None,
        }
    }
}

impl PublishState {
    /// Parse a stored state, keeping unrecognised values as `Unknown`
    pub fn from_stored(s: &str) -> Self {
        Self::from_str(s).unwrap_or(PublishState::Unknown)
    }
}

impl std::fmt::Display for PublishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input for creating a content item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContentInput {
    pub domain: ContentDomain,
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub level_id: Option<i64>,
    /// Publication state (defaults to Draft)
    pub state: Option<PublishState>,
    /// Date (defaults to now)
    pub date: Option<DateTime<Utc>>,
    pub featured: bool,
    pub price: Option<f64>,
}

impl CreateContentInput {
    /// Create a new CreateContentInput
    pub fn new(domain: ContentDomain, title: impl Into<String>, category_id: i64) -> Self {
        Self {
            domain,
            title: title.into(),
            description: String::new(),
            category_id,
            level_id: None,
            state: None,
            date: None,
            featured: false,
            price: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_level(mut self, level_id: i64) -> Self {
        self.level_id = Some(level_id);
        self
    }

    pub fn with_state(mut self, state: PublishState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// Validate the input before it reaches the repository
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if self.state == Some(PublishState::Unknown) {
            return Err("State must be draft, published or archived".to_string());
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(format!("Price must be a non-negative amount, got {}", price));
            }
        }
        Ok(())
    }
}
