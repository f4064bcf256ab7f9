//! Pagination types
//!
//! - `PageRequest` carries a 1-based page number and a fixed page size
//! - `Paginated<T>` is the slice handed to presentation, with page metadata

use serde::{Deserialize, Serialize};

/// Requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 6,
        }
    }
}

impl PageRequest {
    /// Create a page request; page and size are raised to at least 1
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Offset of the first item on this page
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.page_size as usize
    }
}

/// One page of a gated sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on the current page
    pub items: Vec<T>,
    /// Number of items in the whole (gated) sequence
    pub total: usize,
    /// Current page number after clamping (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
    /// Number of pages, never less than 1
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Check if there is a previous page
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Pagination controls are only shown when there is more than one page
    pub fn show_pagination(&self) -> bool {
        self.total_pages > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Convert the items while keeping page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: PageRequest::default().page_size,
            total_pages: 1,
        }
    }
}
