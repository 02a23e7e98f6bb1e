/// 1-based page cursor for list screens.
///
/// Navigation is clamped to `[1, total_pages]`; while the page count is
/// still unknown (0) only the current page is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page: u32,
    limit: u32,
    total_pages: u32,
}

impl Pager {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total_pages: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    /// Record the page count reported with the latest fetch.
    /// The current page is pulled back if the list shrank.
    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
        if total_pages > 0 && self.page > total_pages {
            self.page = total_pages;
        }
    }

    /// Same as `set_total_pages`, from an item count.
    pub fn set_total_items(&mut self, total: u64) {
        let pages = total.div_ceil(u64::from(self.limit));
        self.set_total_pages(u32::try_from(pages).unwrap_or(u32::MAX));
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    // Each move returns whether the page changed, i.e. whether to refetch.

    pub fn first(&mut self) -> bool {
        self.go_to(1)
    }

    pub fn prev(&mut self) -> bool {
        self.has_prev() && self.go_to(self.page - 1)
    }

    pub fn next(&mut self) -> bool {
        self.has_next() && self.go_to(self.page + 1)
    }

    pub fn last(&mut self) -> bool {
        self.total_pages > 0 && self.go_to(self.total_pages)
    }

    fn go_to(&mut self, page: u32) -> bool {
        if page == self.page {
            return false;
        }
        self.page = page;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_starts_at_one() {
        let pager = Pager::new(4);
        assert_eq!(pager.page(), 1);
        assert!(!pager.has_prev());
        assert!(!pager.has_next());
    }

    #[test]
    fn test_total_items_rounds_up() {
        let mut pager = Pager::new(4);
        pager.set_total_items(9);
        assert_eq!(pager.total_pages(), 3);

        pager.set_total_items(8);
        assert_eq!(pager.total_pages(), 2);

        pager.set_total_items(0);
        assert_eq!(pager.total_pages(), 0);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut pager = Pager::new(10);
        pager.set_total_pages(3);

        assert!(!pager.prev());
        assert!(!pager.first());

        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.page(), 3);
        assert!(!pager.next());

        assert!(pager.first());
        assert!(pager.last());
        assert_eq!(pager.page(), 3);
        assert!(!pager.last());

        assert!(pager.prev());
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn test_unknown_total_stays_put() {
        let mut pager = Pager::new(4);
        assert!(!pager.next());
        assert!(!pager.last());
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn test_shrinking_list_pulls_page_back() {
        let mut pager = Pager::new(4);
        pager.set_total_pages(5);
        pager.last();
        assert_eq!(pager.page(), 5);

        pager.set_total_pages(2);
        assert_eq!(pager.page(), 2);
    }

    #[test]
    fn test_zero_limit_is_bumped() {
        let mut pager = Pager::new(0);
        assert_eq!(pager.limit(), 1);
        pager.set_total_items(3);
        assert_eq!(pager.total_pages(), 3);
    }
}
