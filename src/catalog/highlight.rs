//! Highlight selector for featured widgets

use crate::models::ContentItem;

/// Default number of highlighted items
pub const DEFAULT_HIGHLIGHT_LIMIT: usize = 5;

/// Pick up to `limit` items to feature.
///
/// Explicitly featured items win, in collection order. Without any, the
/// most recent items are taken; ties keep collection order.
pub fn select_highlights(items: &[ContentItem], limit: usize) -> Vec<ContentItem> {
    if items.iter().any(|item| item.featured) {
        return items
            .iter()
            .filter(|item| item.featured)
            .take(limit)
            .cloned()
            .collect();
    }

    let mut recent: Vec<&ContentItem> = items.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.into_iter().take(limit).cloned().collect()
}
