use serde::Serialize;

/// One-based page numbers to render, `None` marking an ellipsis.
fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    let mut pages = Vec::new();

    let left_end = left_edge.saturating_add(1).min(last_page.saturating_add(1));
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page.saturating_add(1));

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// Pagination controls rendered under a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub pages: Vec<Option<usize>>,
    /// One-based number of the current page.
    pub page: usize,
    pub page_count: usize,
}

impl PageWindow {
    pub fn new(current_page: usize, page_count: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        // A page past the end centres the window on the last page.
        let pages = get_pages(page_count, current_page.min(page_count.max(1)), 2, 2, 4, 2);

        Self {
            pages,
            page: current_page,
            page_count,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pages_for_empty_list() {
        let window = PageWindow::new(1, 0);

        assert!(window.pages.is_empty());
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn short_lists_show_every_page() {
        let window = PageWindow::new(2, 4);

        assert_eq!(window.pages, vec![Some(1), Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn long_lists_collapse_into_ellipses() {
        let window = PageWindow::new(10, 20);

        assert_eq!(
            window.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
        assert!(window.has_next());
        assert!(window.has_previous());
    }

    #[test]
    fn current_page_past_the_end_does_not_overflow() {
        let window = PageWindow::new(usize::MAX, 20);

        assert_eq!(
            window.pages,
            vec![Some(1), Some(2), None, Some(18), Some(19), Some(20)]
        );
        assert_eq!(window.page, usize::MAX);
        assert!(!window.has_next());
    }
}
