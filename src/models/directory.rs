//! Directory models
//!
//! Categories and audience levels are flat `{id, name}` lists referenced by id
//! from content items. They are only used for id → name resolution.

use serde::{Deserialize, Serialize};

/// Content category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Audience level (nivel) used to scope content to a user cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: i64,
    pub name: String,
}

impl Level {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Look up a display name by id, falling back to `default` for dangling references.
pub fn category_name<'a>(categories: &'a [Category], id: i64, default: &'a str) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == id)
        .map(|c| c.name.as_str())
        .unwrap_or(default)
}

/// Look up a level name; an absent or dangling reference yields `default`.
pub fn level_name<'a>(levels: &'a [Level], id: Option<i64>, default: &'a str) -> &'a str {
    id.and_then(|id| levels.iter().find(|l| l.id == id))
        .map(|l| l.name.as_str())
        .unwrap_or(default)
}
