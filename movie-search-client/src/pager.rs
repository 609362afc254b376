use getset::CopyGetters;
use std::ops::Range;

/// Number of results shown per page.
pub const PAGE_SIZE: usize = 6;

/// `max(1, ceil(item_count / page_size))`.
pub fn total_pages(item_count: usize, page_size: usize) -> usize {
    item_count.div_ceil(page_size.max(1)).max(1)
}

/// A 1-based page position over a result list, always inside
/// `1..=total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct PageWindow {
    page_index: usize,
    page_size: usize,
    total_pages: usize,
}

impl PageWindow {
    /// Builds the window for `page_index`, clamping out-of-range requests
    /// onto the first or last page.
    pub fn new(item_count: usize, page_index: usize, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_pages(item_count, page_size);
        Self {
            page_index: page_index.clamp(1, total_pages),
            page_size,
            total_pages,
        }
    }

    /// Indices of the items on this page, cut at `item_count`.
    pub fn range(&self, item_count: usize) -> Range<usize> {
        let start = ((self.page_index - 1) * self.page_size).min(item_count);
        let end = (self.page_index * self.page_size).min(item_count);
        start..end
    }

    pub fn has_next(&self) -> bool {
        self.page_index < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 1
    }
}

/// The items of one page together with its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub window: PageWindow,
}

pub fn paginate<T>(items: &[T], page_index: usize, page_size: usize) -> Page<'_, T> {
    let window = PageWindow::new(items.len(), page_index, page_size);
    Page {
        items: &items[window.range(items.len())],
        window,
    }
}
