//! Pagination primitives shared by the contact and portfolio listings

use serde::{Deserialize, Serialize};

/// A validated page request. Out-of-range values are coerced, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Builds a request from raw query values. Missing values take the
    /// defaults, `page < 1` becomes 1 and `page_size` is clamped to
    /// `[1, max_page_size]`.
    pub fn clamped(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: u32,
        max_page_size: u32,
    ) -> Self {
        let max_page_size = max_page_size.max(1);
        let page = page.unwrap_or(1).clamp(1, u32::MAX as i64) as u32;
        let page_size = page_size
            .unwrap_or(default_page_size as i64)
            .clamp(1, max_page_size as i64) as u32;

        Self { page, page_size }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    pub fn limit(&self) -> u64 {
        self.page_size as u64
    }

    /// Slices an already-ordered collection down to this page.
    pub fn slice<T: Clone>(&self, items: &[T]) -> PagedResult<T> {
        let total = items.len() as u64;
        let start = self.offset().min(total) as usize;
        let end = (self.offset() + self.limit()).min(total) as usize;

        PagedResult::new(items[start..end].to_vec(), total, *self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_items: u64, request: PageRequest) -> Self {
        let page_size = request.page_size.max(1);
        let total_pages = total_items.div_ceil(page_size as u64).min(u32::MAX as u64) as u32;

        Self {
            items,
            total_items,
            page: request.page,
            page_size,
            total_pages,
            has_next_page: request.page < total_pages,
            has_previous_page: request.page > 1,
        }
    }

    /// The result served when the underlying read fails.
    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(PageRequest::clamped(Some(1), Some(0), 8, 50).page_size, 1);
        assert_eq!(PageRequest::clamped(Some(1), Some(-4), 8, 50).page_size, 1);
        assert_eq!(PageRequest::clamped(Some(1), Some(51), 8, 50).page_size, 50);
        assert_eq!(PageRequest::clamped(Some(1), Some(10_000), 10, 500).page_size, 500);
        assert_eq!(PageRequest::clamped(Some(1), Some(12), 8, 50).page_size, 12);
    }

    #[test]
    fn test_defaults_and_page_floor() {
        let request = PageRequest::clamped(None, None, 8, 50);
        assert_eq!(request, PageRequest { page: 1, page_size: 8 });

        assert_eq!(PageRequest::clamped(Some(0), None, 8, 50).page, 1);
        assert_eq!(PageRequest::clamped(Some(-3), None, 8, 50).page, 1);
    }

    #[test]
    fn test_derived_flags() {
        let request = PageRequest { page: 2, page_size: 4 };
        let result = PagedResult::new(vec![5, 6, 7, 8], 10, request);

        assert_eq!(result.total_pages, 3);
        assert!(result.has_next_page);
        assert!(result.has_previous_page);

        let last = PagedResult::new(vec![9, 10], 10, PageRequest { page: 3, page_size: 4 });
        assert!(!last.has_next_page);
    }

    #[test]
    fn test_pages_beyond_range_are_empty_with_true_totals() {
        let items: Vec<u32> = (1..=10).collect();

        for page in 4..8 {
            let result = PageRequest { page, page_size: 4 }.slice(&items);
            assert!(result.items.is_empty());
            assert_eq!(result.total_items, 10);
            assert_eq!(result.total_pages, 3);
            assert!(!result.has_next_page);
        }
    }

    #[test]
    fn test_slice_keeps_order() {
        let items: Vec<u32> = (1..=10).collect();
        let result = PageRequest { page: 2, page_size: 3 }.slice(&items);
        assert_eq!(result.items, vec![4, 5, 6]);
    }

    #[test]
    fn test_empty_collection() {
        let result = PageRequest { page: 1, page_size: 8 }.slice::<u32>(&[]);
        assert_eq!(result.total_pages, 0);
        assert!(!result.has_next_page);
        assert!(!result.has_previous_page);
    }

    #[test]
    fn test_serialized_shape() {
        let result = PagedResult::new(vec!["a"], 1, PageRequest { page: 1, page_size: 10 });
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["totalItems"], 1);
        assert_eq!(value["pageSize"], 10);
        assert_eq!(value["items"][0], "a");
    }
}
