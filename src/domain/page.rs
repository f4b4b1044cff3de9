use serde::{Deserialize, Serialize};

use crate::domain::types::{PageIndex, PageSize};

/// Requested window into a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub index: PageIndex,
    pub size: PageSize,
}

impl PageRequest {
    pub fn new(index: PageIndex, size: PageSize) -> Self {
        Self { index, size }
    }

    pub fn first(size: PageSize) -> Self {
        Self::new(PageIndex::FIRST, size)
    }

    /// Number of items preceding this page.
    pub fn skip(&self) -> usize {
        self.index.get().saturating_mul(self.size.get())
    }

    pub fn limit(&self) -> usize {
        self.size.get()
    }

    pub fn next(&self) -> Self {
        Self::new(self.index.next(), self.size)
    }
}

/// Number of pages needed to show `total` items.
pub fn page_count(total: usize, size: PageSize) -> usize {
    total.div_ceil(size.get())
}

/// Slice of a list returned for a [`PageRequest`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    /// Items matching the filters across all pages.
    pub total: usize,
}

impl<T> PageResult<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    pub fn page_count(&self, size: PageSize) -> usize {
        page_count(self.total, size)
    }

    /// `true` when pages beyond `page` hold more items.
    pub fn has_more_after(&self, page: &PageRequest) -> bool {
        page.skip().saturating_add(self.items.len()) < self.total
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
