//! Data models
//!
//! This module contains the data structures used throughout the catalog.
//! Models represent:
//! - Content entities (ContentItem) and their directories (Category, Level)
//! - Caller identity and the sessions it is derived from
//! - Listing criteria and pagination types

mod content;
mod criteria;
mod directory;
mod identity;
mod pagination;
mod session;

pub use content::{ContentDomain, ContentItem, CreateContentInput, PublishState};
pub use criteria::{CategoryFilter, FilterCriteria, LevelMode};
pub use directory::{category_name, level_name, Category, Level};
pub use identity::Identity;
pub use pagination::{PageRequest, Paginated};
pub use session::{Member, Session};
