//! Page-number pagination primitives shared by list endpoints.
//!
//! Callers request a 1-based page and an optional page size; endpoints reply
//! with an envelope carrying the total row count and the neighbouring page
//! numbers. Keeping the types here prevents each endpoint from growing its
//! own slightly different clamping rules.

use serde::{Deserialize, Serialize};

/// Page size applied when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Hard upper bound on the caller-supplied page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Errors raised while validating pagination query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// Page numbers are 1-based; zero is rejected rather than clamped.
    #[error("page must be at least 1")]
    ZeroPage,
    /// A zero page size would make every page empty.
    #[error("page_size must be at least 1")]
    ZeroPageSize,
    /// Page size exceeded the hard cap.
    #[error("page_size must not exceed {max}")]
    PageSizeTooLarge { max: u32 },
}

/// Validated pagination parameters.
///
/// ## Invariants
/// - `page >= 1`
/// - `1 <= page_size <= MAX_PAGE_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    page_size: u32,
}

impl PageParams {
    /// Validate raw query values, applying the default page and size where
    /// the caller omitted them.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Result<Self, PageParamsError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(PageParamsError::ZeroPage);
        }
        let page_size = page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            return Err(PageParamsError::ZeroPageSize);
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(PageParamsError::PageSizeTooLarge { max: MAX_PAGE_SIZE });
        }
        Ok(Self { page, page_size })
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Zero-based offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Response envelope for a single page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages.
    pub count: u64,
    /// Next page number, when one exists.
    pub next: Option<u32>,
    /// Previous page number, when one exists.
    pub previous: Option<u32>,
    /// Items on this page.
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Slice an in-memory result set into the requested page.
    ///
    /// The total count is taken from the full collection, so `next` stays
    /// accurate even when the requested page lies beyond the last item.
    #[must_use]
    pub fn from_full_results(items: Vec<T>, params: PageParams) -> Self {
        let count = items.len() as u64;
        let results: Vec<T> = items
            .into_iter()
            .skip(params.offset())
            .take(params.page_size() as usize)
            .collect();
        Self::from_counted(results, count, params)
    }

    /// Wrap an already-sliced page together with the total count.
    #[must_use]
    pub fn from_counted(results: Vec<T>, count: u64, params: PageParams) -> Self {
        let page = params.page();
        let page_size = u64::from(params.page_size());
        let last_page = count.div_ceil(page_size).max(1);
        let next = (u64::from(page) < last_page).then(|| page + 1);
        let previous = (page > 1).then(|| page - 1);
        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Map the results while keeping the envelope intact.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
