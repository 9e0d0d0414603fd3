//! Offset pagination for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PER_PAGE: i64 = 15;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: i64 = 100;

/// Page query parameters (`?page=2&per_page=20`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Clamp user input into a usable request.
    #[must_use]
    pub const fn new(page: i64, per_page: i64) -> Self {
        Self { page, per_page }.normalized()
    }

    /// Page at least 1, page size within `1..=MAX_PER_PAGE`.
    #[must_use]
    pub const fn normalized(self) -> Self {
        let page = if self.page < 1 { 1 } else { self.page };
        let per_page = if self.per_page < 1 {
            1
        } else if self.per_page > MAX_PER_PAGE {
            MAX_PER_PAGE
        } else {
            self.per_page
        };
        Self { page, per_page }
    }

    /// SQL `LIMIT`.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.normalized().per_page
    }

    /// SQL `OFFSET`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        let n = self.normalized();
        (n.page - 1).saturating_mul(n.per_page)
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: i64) -> Self {
        let request = request.normalized();
        let total = total.max(0);
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);
        Self {
            data,
            page: request.page,
            per_page: request.per_page,
            total,
            last_page,
        }
    }

    /// Transform the items, keeping the paging metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.limit(), 15);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamps_input() {
        let req = PageRequest::new(0, 500);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
        assert_eq!(PageRequest::new(-3, 0).per_page, 1);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
    }

    #[test]
    fn test_unnormalized_deserialized_request_still_clamps() {
        let req: PageRequest =
            serde_json::from_str(r#"{"page": -1, "per_page": 1000}"#).unwrap_or_default();
        assert_eq!(req.limit(), MAX_PER_PAGE);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_last_page() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 15), 31);
        assert_eq!(page.last_page, 3);
        let empty: Page<i32> = Page::new(vec![], PageRequest::default(), 0);
        assert_eq!(empty.last_page, 1);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 4).map(|n| n * 10);
        assert_eq!(page.data, vec![10, 20]);
        assert_eq!(page.page, 2);
        assert_eq!(page.total, 4);
    }
}
