//! Markup helpers
//!
//! Titles and descriptions are rich text. Slugs and search both work on the
//! plain-text form: tags removed, a fixed set of named entities decoded.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static TAG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"));

/// Entities decoded by `decode_entities`. `&amp;` comes last so that
/// `&amp;lt;` decodes once to `&lt;` and not twice to `<`.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&#39;", "'"),
    ("&amp;", "&"),
];

/// Remove every `<...>` tag
pub fn strip_tags(input: &str) -> Cow<'_, str> {
    TAG_PATTERN.replace_all(input, "")
}

/// Decode the fixed set of named entities; anything else is left verbatim
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    ENTITIES
        .iter()
        .fold(input.to_string(), |acc, (entity, replacement)| {
            acc.replace(entity, replacement)
        })
}

/// Plain-text form of a rich-text field
pub fn plain_text(input: &str) -> String {
    decode_entities(&strip_tags(input))
}
