//! Fixed-size pagination over an in-memory collection.
//!
//! Pages are 1-based. A page past the end is an empty slice, never an error and never
//! clamped to the last page.

use std::ops::RangeInclusive;

pub const PAGE_SIZE: usize = 10;

/// Most page numbers shown at once in the page control.
pub const MAX_VISIBLE_PAGES: u32 = 5;

/// Number of pages needed for `count` items (`ceil(count / PAGE_SIZE)`).
pub fn total_pages(count: usize) -> u32 {
    u32::try_from(count.div_ceil(PAGE_SIZE)).unwrap_or(u32::MAX)
}

/// `items[(page-1)*PAGE_SIZE .. page*PAGE_SIZE]`, clipped to `items`. Page 0 is empty.
pub fn page_slice<T>(items: &[T], page: u32) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page as usize - 1).saturating_mul(PAGE_SIZE);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Sliding window of at most five page numbers centred on `current`, clamped to `[1, total]`.
/// Empty when there are no pages.
pub fn visible_pages(current: u32, total: u32) -> RangeInclusive<u32> {
    let half = MAX_VISIBLE_PAGES / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = total.min(start.saturating_add(MAX_VISIBLE_PAGES - 1));
    if end.saturating_sub(start) + 1 < MAX_VISIBLE_PAGES {
        start = end.saturating_sub(MAX_VISIBLE_PAGES - 1).max(1);
    }
    start..=end
}

/// Everything the page control renders; a pure function of `(current, total)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub current: u32,
    pub total: u32,
    pub pages: Vec<u32>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PageControls {
    pub fn new(current: u32, total: u32) -> Self {
        Self {
            current,
            total,
            pages: visible_pages(current, total).collect(),
            prev_enabled: current != 1,
            next_enabled: current != total,
        }
    }

    /// Target of the "previous" control.
    pub fn prev(&self) -> u32 {
        self.current.saturating_sub(1)
    }

    /// Target of the "next" control.
    pub fn next(&self) -> u32 {
        self.current.saturating_add(1)
    }
}

/// Read the `page` query parameter; absent or non-numeric means page 1.
pub fn parse_page(query: &str) -> u32 {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "page")
        .and_then(|(_, v)| v.trim().parse::<u32>().ok())
        .unwrap_or(1)
}
