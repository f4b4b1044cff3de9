use serde::Serialize;

use crate::domain::filter::FilterCriteria;
use crate::pagination::PageWindow;

/// Display state of a list region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListStatus {
    /// Nothing has been requested yet.
    Idle,
    /// A fetch for the current state is in flight.
    Loading,
    Ready,
    /// The filters match no items; offer to clear them.
    Empty,
    /// The last fetch failed; `items` still hold the last good page.
    Error,
}

/// Everything a caller needs to render a list and its controls.
#[derive(Debug, Serialize)]
pub struct ListView<T> {
    pub items: Vec<T>,
    pub total: usize,
    /// Zero-based index of the current page.
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub pagination: PageWindow,
    pub has_more: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub status: ListStatus,
    pub filters: FilterCriteria,
    /// Client-side sort as `field:direction` pairs.
    pub sort: String,
}
