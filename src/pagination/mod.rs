//! Page windows over listing results.
//!
//! The engine is a pure function of the full result set, the requested page
//! and the configured page size. Out-of-range page numbers are clamped rather
//! than rejected, and navigation links are only emitted where they lead
//! somewhere.

use serde::{Deserialize, Serialize};
use std::num::{IntErrorKind, NonZeroUsize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page size must be positive, got {0}")]
    InvalidPageSize(i64),
}

/// Validated page size. Constructing one is the only place a bad size can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    pub fn new(size: i64) -> Result<Self, PaginationError> {
        usize::try_from(size)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or(PaginationError::InvalidPageSize(size))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// Navigation entries valid for the current position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_page: Option<String>,
}

impl PageLinks {
    pub fn is_empty(&self) -> bool {
        self.next_page.is_none()
            && self.last_page.is_none()
            && self.prev_page.is_none()
            && self.first_page.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub links: PageLinks,
}

/// Paginates listings of one collection path (e.g. `/businesses`).
#[derive(Debug, Clone)]
pub struct Paginator {
    base_path: String,
    page_size: PageSize,
}

impl Paginator {
    pub fn new(base_path: impl Into<String>, page_size: PageSize) -> Self {
        Self { base_path: base_path.into(), page_size }
    }

    /// Window `results` at `requested_page`; `total_count` is `results.len()`.
    pub fn paginate<T>(&self, results: Vec<T>, requested_page: i64) -> Page<T> {
        let total_count = results.len();
        self.paginate_counted(results, total_count, requested_page)
    }

    /// Like [`paginate`](Self::paginate) but reports a separately queried
    /// count. Callers must keep `total_count` consistent with `results`.
    pub fn paginate_counted<T>(&self, results: Vec<T>, total_count: usize, requested_page: i64) -> Page<T> {
        let size = self.page_size.get();
        let total_pages = results.len().div_ceil(size);
        let page = clamp_page(requested_page, total_pages);

        let start = (page - 1).saturating_mul(size);
        let items: Vec<T> = results.into_iter().skip(start).take(size).collect();

        Page {
            items,
            page_number: page,
            total_pages,
            page_size: size,
            total_count,
            links: self.links(page, total_pages),
        }
    }

    fn links(&self, page: usize, total_pages: usize) -> PageLinks {
        let mut links = PageLinks::default();
        if page < total_pages {
            links.next_page = Some(self.page_link(page + 1));
            links.last_page = Some(self.page_link(total_pages));
        }
        if page > 1 {
            links.prev_page = Some(self.page_link(page - 1));
            links.first_page = Some(self.page_link(1));
        }
        links
    }

    fn page_link(&self, page: usize) -> String {
        format!("{}?page={}", self.base_path, page)
    }
}

/// Upper bound first, then lower bound, so zero pages still yields page 1.
fn clamp_page(requested: i64, total_pages: usize) -> usize {
    let total = i64::try_from(total_pages).unwrap_or(i64::MAX);
    let page = requested.min(total).max(1);
    usize::try_from(page).unwrap_or(1)
}

/// `?page=` query parameter. Absent or non-numeric values mean page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Digit runs too large for `i64` saturate, so they still clamp to the last page.
    pub fn requested_page(&self) -> i64 {
        let Some(raw) = self.page.as_deref() else {
            return 1;
        };
        match raw.trim().parse::<i64>() {
            Ok(page) => page,
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => i64::MAX,
                IntErrorKind::NegOverflow => i64::MIN,
                _ => 1,
            },
        }
    }
}
