use std::num::NonZeroU32;

/// Current page of a view plus its fixed page size.
///
/// Pages are 1-based. Navigation past either end is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    page: u32,
    page_size: NonZeroU32,
}

impl PaginationCursor {
    pub fn new(page_size: NonZeroU32) -> Self {
        Self { page: 1, page_size }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.get()
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size.get())
    }

    pub fn limit(&self) -> u32 {
        self.page_size.get()
    }

    /// `ceil(total / page_size)`; zero for an empty collection.
    pub fn total_pages(&self, total_count: u64) -> u32 {
        let pages = total_count.div_ceil(u64::from(self.page_size.get()));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists; false while the total is unknown.
    pub fn has_next(&self, total_count: Option<u64>) -> bool {
        match total_count {
            Some(total) if total > 0 => self.page < self.total_pages(total),
            _ => false,
        }
    }

    /// Returns whether the page changed.
    pub fn go_to_previous_page(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Returns whether the page changed.
    pub fn go_to_next_page(&mut self, total_count: Option<u64>) -> bool {
        if !self.has_next(total_count) {
            return false;
        }
        self.page += 1;
        true
    }

    /// Back to page 1. Returns whether the page changed.
    pub fn reset(&mut self) -> bool {
        let changed = self.page != 1;
        self.page = 1;
        changed
    }

    /// Jump to a page, treating 0 as 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Pull the page back to the last page of `total_count`.
    ///
    /// An empty collection leaves the page untouched. Returns whether the
    /// page changed.
    pub fn clamp_to(&mut self, total_count: u64) -> bool {
        let last = self.total_pages(total_count);
        if last > 0 && self.page > last {
            self.page = last;
            return true;
        }
        false
    }

    /// 1-based index of the first row on this page, for display.
    pub fn first_item_index(&self) -> u64 {
        self.offset() + 1
    }

    /// 1-based index of the last row on this page, for display.
    pub fn last_item_index(&self, total_count: u64) -> u64 {
        (u64::from(self.page) * u64::from(self.page_size.get())).min(total_count)
    }
}
