//! Slug codec
//!
//! A slug is the URL-safe form of an item title with the item id appended:
//! `"Ética Docente"` with id 5 becomes `tica-docente-5`. The trailing digit
//! run is the canonical id; everything before it is a readable hint that may
//! go stale when the title changes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::text::plain_text;
use super::CatalogError;
use crate::models::ContentItem;

static ID_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|-)([0-9]+)$").expect("id suffix pattern is a valid regex"));

/// Path or query value carrying a slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugInput<'a> {
    Missing,
    One(&'a str),
    /// Repeated query parameter; never decodes to an id
    Many(Vec<&'a str>),
}

impl<'a> From<&'a str> for SlugInput<'a> {
    fn from(value: &'a str) -> Self {
        SlugInput::One(value)
    }
}

impl<'a> From<Option<&'a str>> for SlugInput<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(SlugInput::Missing, SlugInput::One)
    }
}

impl<'a> From<&'a [String]> for SlugInput<'a> {
    fn from(values: &'a [String]) -> Self {
        match values {
            [] => SlugInput::Missing,
            [one] => SlugInput::One(one.as_str()),
            many => SlugInput::Many(many.iter().map(String::as_str).collect()),
        }
    }
}

/// Normalise a title into its slug body.
///
/// Markup is stripped and the fixed entity set decoded before lowercasing;
/// every maximal run outside `[a-z0-9]` becomes one hyphen and edge hyphens
/// are dropped. Accented letters fall outside the kept set.
pub fn clean_slug(title: &str) -> String {
    let text = plain_text(title).to_lowercase();
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Build the slug for an item. A zero or absent id leaves the bare body.
pub fn encode_slug(title: &str, id: Option<i64>) -> String {
    let body = clean_slug(title);
    match id {
        Some(id) if id != 0 => {
            if body.is_empty() {
                id.to_string()
            } else {
                format!("{}-{}", body, id)
            }
        }
        _ => body,
    }
}

/// Extract the id hint from a slug.
///
/// Returns `None` when the input is missing, multi-valued, carries no
/// trailing digit run, or the digits overflow `i64`.
pub fn decode_id<'a>(input: impl Into<SlugInput<'a>>) -> Option<i64> {
    match input.into() {
        SlugInput::One(segment) => ID_SUFFIX
            .captures(segment)
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<i64>().ok()),
        SlugInput::Missing | SlugInput::Many(_) => None,
    }
}

/// Resolve a path segment against a collection.
///
/// The id hint wins when it names an item in the collection; otherwise the
/// first item whose recomputed slug body equals the segment is returned.
pub fn resolve<'a>(items: &'a [ContentItem], segment: &str) -> Result<&'a ContentItem, CatalogError> {
    if let Some(id) = decode_id(segment) {
        if let Some(item) = items.iter().find(|item| item.id == id) {
            return Ok(item);
        }
    }

    items
        .iter()
        .find(|item| clean_slug(&item.title) == segment)
        .ok_or_else(|| CatalogError::NotFound(segment.to_string()))
}
