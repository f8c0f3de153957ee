//! Pagination request and response types.

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Pagination parameters from query strings.
///
/// Out-of-range values are clamped rather than rejected: page defaults
/// to 1, page size to 10 and never above 100.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default)]
    pub page: Option<u64>,
    /// Number of items per page.
    #[serde(default, alias = "pageSize")]
    pub page_size: Option<u64>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Some(1),
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

impl PageRequest {
    /// Effective page number, always at least 1.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to `1..=100`.
    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page.
    ///
    /// Saturates instead of overflowing, so an absurd page number from
    /// a query string yields an empty page rather than a panic.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.page()
            .saturating_sub(1)
            .saturating_mul(self.page_size())
    }
}

/// Pagination metadata included in list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u64,
    /// Items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl PageMeta {
    /// Builds metadata for a page of a `total`-item result set.
    #[must_use]
    pub fn new(request: &PageRequest, total: u64) -> Self {
        let page_size = request.page_size();
        Self {
            page: request.page(),
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }
}

/// A page of items plus pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct PageResponse<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Pagination metadata.
    #[serde(flatten)]
    pub meta: PageMeta,
}

impl<T> PageResponse<T> {
    /// Wraps a page of items with its metadata.
    #[must_use]
    pub fn new(items: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            items,
            meta: PageMeta::new(request, total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn request(page: Option<u64>, page_size: Option<u64>) -> PageRequest {
        PageRequest { page, page_size }
    }

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), Some(0), 1, 1)]
    #[case(Some(3), Some(25), 3, 25)]
    #[case(Some(1), Some(500), 1, 100)]
    fn test_clamping(
        #[case] page: Option<u64>,
        #[case] page_size: Option<u64>,
        #[case] want_page: u64,
        #[case] want_size: u64,
    ) {
        let req = request(page, page_size);
        assert_eq!(req.page(), want_page);
        assert_eq!(req.page_size(), want_size);
    }

    #[test]
    fn test_offset() {
        assert_eq!(request(Some(1), Some(10)).offset(), 0);
        assert_eq!(request(Some(3), Some(10)).offset(), 20);
        assert_eq!(request(Some(0), Some(10)).offset(), 0);
    }

    #[test]
    fn test_offset_saturates_for_huge_pages() {
        assert_eq!(request(Some(u64::MAX), Some(100)).offset(), u64::MAX);
        assert_eq!(request(Some(u64::MAX), None).offset(), u64::MAX);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let req = request(Some(1), Some(10));
        assert_eq!(PageMeta::new(&req, 0).total_pages, 0);
        assert_eq!(PageMeta::new(&req, 10).total_pages, 1);
        assert_eq!(PageMeta::new(&req, 11).total_pages, 2);
        assert_eq!(PageMeta::new(&req, 95).total_pages, 10);
    }

    proptest! {
        #[test]
        fn prop_page_size_always_in_range(page_size in proptest::option::of(any::<u64>())) {
            let size = request(None, page_size).page_size();
            prop_assert!((1..=MAX_PAGE_SIZE).contains(&size));
        }

        // Any query-string combination yields an offset, never a panic.
        #[test]
        fn prop_offset_total(
            page in proptest::option::of(any::<u64>()),
            page_size in proptest::option::of(any::<u64>()),
        ) {
            let req = request(page, page_size);
            let _ = req.offset();
        }

        #[test]
        fn prop_total_pages_covers_total(total in 0u64..100_000, page_size in 1u64..=100) {
            let req = request(Some(1), Some(page_size));
            let meta = PageMeta::new(&req, total);
            prop_assert!(meta.total_pages * meta.page_size >= total);
            prop_assert!(meta.total_pages.saturating_sub(1) * meta.page_size < total || total == 0);
        }
    }
}
