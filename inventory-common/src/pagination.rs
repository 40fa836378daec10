//! Pagination utilities for instrument listings
//!
//! Page numbers are 1-indexed. Page size is clamped to
//! [`MIN_PAGE_SIZE`]..=[`MAX_PAGE_SIZE`], defaulting to [`DEFAULT_PAGE_SIZE`].

use serde::{Deserialize, Serialize};

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 50;

pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest page a listing will return
pub const MAX_PAGE_SIZE: i64 = 100;

/// Requested page, already clamped to valid bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Clamp a raw page request: page to at least 1, page size to [1, 100]
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata calculated from total results and requested page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Effective page size
    pub page_size: i64,
    /// Total number of pages (at least 1, even for an empty result)
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Calculate pagination metadata from total results and the requested page
///
/// Pages past the end are not clamped back: they simply select no rows, so
/// summing items over pages `1..=total_pages` always yields `total_results`.
///
/// # Examples
/// ```
/// use inventory_common::pagination::{calculate_pagination, PageRequest};
///
/// // 120 results at 50 per page = 3 pages (50 + 50 + 20)
/// let p = calculate_pagination(120, PageRequest::new(Some(2), Some(50)));
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 50);
///
/// // An empty result still reports one page
/// let p = calculate_pagination(0, PageRequest::default());
/// assert_eq!(p.total_pages, 1);
/// ```
pub fn calculate_pagination(total_results: i64, request: PageRequest) -> Pagination {
    let page_size = request.page_size();
    let total_pages = ((total_results + page_size - 1) / page_size).max(1);
    let page = request.page();
    let offset = (page - 1).saturating_mul(page_size);

    Pagination {
        page,
        page_size,
        total_pages,
        offset,
    }
}
