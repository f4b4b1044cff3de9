//! Incremental "load more" lists.
use std::collections::HashSet;

use crate::domain::sort::ListItem;

/// Append-only list built from successive pages.
///
/// No two elements share an identity and items keep the order in which they
/// were first fetched. Overlaps between adjacent pages (for example when rows
/// are inserted between two fetches and shift the offsets) are dropped.
#[derive(Debug, Clone)]
pub struct AccumulatedList<T: ListItem> {
    items: Vec<T>,
    seen: HashSet<T::Id>,
}

impl<T: ListItem> AccumulatedList<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    /// Appends the items not seen before; returns how many were added.
    pub fn extend_page(&mut self, page: impl IntoIterator<Item = T>) -> usize {
        let before = self.items.len();
        for item in page {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.items.len() - before
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.seen.contains(id)
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.seen.clear();
    }
}

impl<T: ListItem> Default for AccumulatedList<T> {
    fn default() -> Self {
        Self::new()
    }
}
