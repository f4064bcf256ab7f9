//! Pagination controller

use crate::models::{PageRequest, Paginated};

/// Fixed-size slicer for a gated sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: u32,
}

impl Paginator {
    /// A zero page size is raised to 1
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of pages for `len` items, never less than 1
    pub fn total_pages(&self, len: usize) -> u32 {
        let size = self.page_size as usize;
        let pages = (len + size - 1) / size;
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }

    /// Clamp a requested page into `[1, total_pages]`
    pub fn clamp(&self, page: u32, len: usize) -> u32 {
        page.clamp(1, self.total_pages(len))
    }

    /// Slice out page `page` (after clamping)
    pub fn page<T: Clone>(&self, items: &[T], page: u32) -> Paginated<T> {
        let page = self.clamp(page, items.len());
        let request = PageRequest::new(page, self.page_size);
        let start = request.offset().min(items.len());
        let end = (start + self.page_size as usize).min(items.len());

        Paginated {
            items: items[start..end].to_vec(),
            total: items.len(),
            page,
            page_size: self.page_size,
            total_pages: self.total_pages(items.len()),
        }
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        #[test]
        fn pages_concatenate_to_input(
            items in prop::collection::vec(any::<u32>(), 0..60),
            size in 1u32..10,
        ) {
            let p = Paginator::new(size);
            let total = p.total_pages(items.len());
            let mut joined = Vec::new();
            for n in 1..=total {
                let page = p.page(&items, n);
                prop_assert!(page.len() <= size as usize);
                joined.extend(page.items);
            }
            prop_assert_eq!(joined, items);
        }

        #[test]
        fn clamped_page_in_range(len in 0usize..100, size in 1u32..10, requested in any::<u32>()) {
            let p = Paginator::new(size);
            let page = p.clamp(requested, len);
            prop_assert!(page >= 1);
            prop_assert!(page <= p.total_pages(len));
        }
    }
}
