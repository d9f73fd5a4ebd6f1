use std::ops::RangeInclusive;

/// Page links shown on each side of the current page.
pub const PAGE_LINK_RADIUS: u64 = 2;
pub const DEFAULT_PAGE_SIZE: u32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Previous { target: u64, enabled: bool },
    Page { number: u64, current: bool },
    Next { target: u64, enabled: bool },
}

/// Clamps `requested_page` into `[1, max(1, ceil(total / page_size))]`.
pub fn compute_pagination(total: u64, page_size: u32, requested_page: i64) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total.div_ceil(u64::from(page_size));
    let last = total_pages.max(1);
    let page = if requested_page < 1 {
        1
    } else {
        (requested_page as u64).min(last)
    };
    Pagination {
        page,
        page_size,
        total,
        total_pages,
    }
}

impl Pagination {
    pub fn offset(&self) -> u64 {
        (self.page - 1) * u64::from(self.page_size)
    }

    pub fn has_controls(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn window(&self) -> RangeInclusive<u64> {
        let start = self.page.saturating_sub(PAGE_LINK_RADIUS).max(1);
        let end = (self.page + PAGE_LINK_RADIUS).min(self.total_pages.max(1));
        start..=end
    }

    /// Previous, the page window, then next. Empty when everything fits on one page.
    pub fn controls(&self) -> Vec<PageControl> {
        if !self.has_controls() {
            return Vec::new();
        }

        let mut controls = Vec::with_capacity(2 * PAGE_LINK_RADIUS as usize + 3);
        controls.push(PageControl::Previous {
            target: self.page.saturating_sub(1).max(1),
            enabled: self.has_previous(),
        });
        controls.extend(self.window().map(|number| PageControl::Page {
            number,
            current: number == self.page,
        }));
        controls.push(PageControl::Next {
            target: (self.page + 1).min(self.total_pages),
            enabled: self.has_next(),
        });
        controls
    }
}

/// Paging state of the despacho list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub page: u64,
    pub page_size: u32,
    pub total: u64,
    pub search: Option<String>,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total: 0,
            search: None,
        }
    }

    pub fn pagination(&self) -> Pagination {
        compute_pagination(self.total, self.page_size, self.page as i64)
    }

    /// Records a reload result and re-clamps the page against the new total.
    pub fn apply_reload(&mut self, requested_page: i64, total: u64) -> Pagination {
        let pagination = compute_pagination(total, self.page_size, requested_page);
        self.total = total;
        self.page = pagination.page;
        pagination
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_always_within_bounds() {
        for total in [0u64, 1, 24, 25, 26, 99, 250, 251] {
            for page_size in [1u32, 7, 25, 100] {
                for requested in [-5i64, 0, 1, 2, 3, 10, 11, 1000, i64::MAX] {
                    let p = compute_pagination(total, page_size, requested);
                    let last = total.div_ceil(u64::from(page_size)).max(1);
                    assert!(
                        (1..=last).contains(&p.page),
                        "total={total} size={page_size} requested={requested} page={}",
                        p.page
                    );
                }
            }
        }
    }

    #[test]
    fn zero_page_size_is_treated_as_one() {
        let p = compute_pagination(3, 0, 3);
        assert_eq!(p.page_size, 1);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.page, 3);
    }

    #[test]
    fn single_page_has_no_controls() {
        let p = compute_pagination(1, 25, 1);
        assert!(!p.has_controls());
        assert!(p.controls().is_empty());

        let empty = compute_pagination(0, 25, 4);
        assert_eq!(empty.page, 1);
        assert!(empty.controls().is_empty());
    }

    #[test]
    fn window_is_centered_with_radius_two() {
        let p = compute_pagination(250, 25, 5);
        assert_eq!(p.total_pages, 10);
        assert_eq!(p.window(), 3..=7);

        let controls = p.controls();
        assert_eq!(
            controls.first(),
            Some(&PageControl::Previous {
                target: 4,
                enabled: true
            })
        );
        assert_eq!(
            controls.last(),
            Some(&PageControl::Next {
                target: 6,
                enabled: true
            })
        );
        assert!(controls.contains(&PageControl::Page {
            number: 5,
            current: true
        }));
        assert_eq!(controls.len(), 7);
    }

    #[test]
    fn window_is_truncated_at_edges_and_edge_controls_disabled() {
        let first = compute_pagination(250, 25, 1);
        assert_eq!(first.window(), 1..=3);
        assert_eq!(
            first.controls()[0],
            PageControl::Previous {
                target: 1,
                enabled: false
            }
        );

        let last = compute_pagination(250, 25, 10);
        assert_eq!(last.window(), 8..=10);
        assert_eq!(
            *last.controls().last().expect("next control"),
            PageControl::Next {
                target: 10,
                enabled: false
            }
        );
    }

    #[test]
    fn reload_reclamps_page_when_total_shrinks() {
        let mut state = PageState::new(25);
        state.apply_reload(4, 100);
        assert_eq!(state.page, 4);

        let pagination = state.apply_reload(4, 30);
        assert_eq!(pagination.page, 2);
        assert_eq!(state.page, 2);
        assert_eq!(pagination.offset(), 25);
    }
}
