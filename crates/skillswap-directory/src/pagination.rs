//! Page arithmetic and the page-label window shown under directory results

use serde::{Serialize, Serializer};
use std::fmt;

/// Number of pages to either side of the current page that stay visible
const WINDOW_DELTA: usize = 2;

/// `ceil(total / page_size)`; zero matches means zero pages
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// One entry of the pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLabel::Page(n) => write!(f, "{}", n),
            PageLabel::Ellipsis => write!(f, "..."),
        }
    }
}

/// Pages serialize as numbers, gaps as the string `"..."`
impl Serialize for PageLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageLabel::Page(n) => serializer.serialize_u64(*n as u64),
            PageLabel::Ellipsis => serializer.serialize_str("..."),
        }
    }
}

/// Labels for a pager: first page, an optional gap, up to two pages either
/// side of `current`, an optional gap, then the last page.
///
/// Empty when there is at most one page.
pub fn page_window(current: usize, total: usize) -> Vec<PageLabel> {
    if total <= 1 {
        return Vec::new();
    }

    // pages past the end show the same window as the last page
    let current = current.min(total);

    let mut labels = vec![PageLabel::Page(1)];
    if current.saturating_sub(WINDOW_DELTA) > 2 {
        labels.push(PageLabel::Ellipsis);
    }

    let start = current.saturating_sub(WINDOW_DELTA).max(2);
    let end = current.saturating_add(WINDOW_DELTA).min(total - 1);
    for page in start..=end {
        labels.push(PageLabel::Page(page));
    }

    if current.saturating_add(WINDOW_DELTA) < total - 1 {
        labels.push(PageLabel::Ellipsis);
    }
    labels.push(PageLabel::Page(total));

    labels
}
