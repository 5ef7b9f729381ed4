//! Client-side paging over an in-memory list.

pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Tracks the current 1-based page. Page count is always derived from the
/// list length so the paginator never needs updating when records change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    current: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// `ceil(len / page_size)`, zero for an empty list
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }

    /// Jump to `page`, clamped into `[1, max(1, total_pages)]`
    pub fn go_to(&mut self, page: usize, len: usize) {
        let last = self.total_pages(len).max(1);
        self.current = page.clamp(1, last);
    }

    /// Re-clamp after the list shrank
    pub fn clamp(&mut self, len: usize) {
        self.go_to(self.current, len);
    }

    pub fn next(&mut self, len: usize) {
        self.go_to(self.current + 1, len);
    }

    pub fn previous(&mut self, len: usize) {
        self.go_to(self.current.saturating_sub(1), len);
    }

    pub fn has_next(&self, len: usize) -> bool {
        self.current < self.total_pages(len)
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    /// Records on the current page
    pub fn page_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current - 1) * self.page_size;
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(items.len());
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seventeen_records_make_three_pages() {
        let records: Vec<u32> = (1..=17).collect();
        let mut pager = Paginator::default();

        assert_eq!(pager.total_pages(records.len()), 3);

        pager.go_to(3, records.len());
        assert_eq!(pager.page_slice(&records), &[17]);
        assert!(!pager.has_next(records.len()));

        pager.go_to(0, records.len());
        assert_eq!(pager.current(), 1);
        pager.go_to(4, records.len());
        assert_eq!(pager.current(), 3);
    }

    #[test]
    fn test_nine_records_split_eight_and_one() {
        let records: Vec<u32> = (1..=9).collect();
        let mut pager = Paginator::default();

        assert_eq!(pager.page_slice(&records).len(), 8);
        assert!(pager.has_next(records.len()));

        pager.next(records.len());
        assert_eq!(pager.page_slice(&records), &[9]);

        pager.next(records.len());
        assert_eq!(pager.current(), 2);

        pager.previous(records.len());
        pager.previous(records.len());
        assert_eq!(pager.current(), 1);
        assert!(!pager.has_previous());
    }

    #[test]
    fn test_empty_list_stays_on_page_one() {
        let records: Vec<u32> = Vec::new();
        let mut pager = Paginator::default();

        pager.next(0);
        assert_eq!(pager.current(), 1);
        assert_eq!(pager.total_pages(0), 0);
        assert!(pager.page_slice(&records).is_empty());
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pager = Paginator::new(8);
        pager.go_to(2, 9);
        pager.clamp(8);
        assert_eq!(pager.current(), 1);
    }
}
