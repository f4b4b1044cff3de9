use serde::Deserialize;

use crate::domain::filter::FilterCriteria;
use crate::domain::page::{PageRequest, PageResult};
use crate::repository::errors::FetchResult;

pub mod errors;
pub mod memory;
#[cfg(feature = "test-mocks")]
pub mod mock;

/// Parameters sent to the remote list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub skip: usize,
    pub limit: usize,
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self {
            skip,
            limit,
            filters: Vec::new(),
        }
    }

    /// Maps every non-default filter 1:1 onto a query parameter.
    pub fn from_state(criteria: &FilterCriteria, page: &PageRequest) -> Self {
        Self {
            skip: page.skip(),
            limit: page.limit(),
            filters: criteria.to_query_pairs(),
        }
    }

    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((name.into(), value.into()));
        self
    }

    pub fn filter_value(&self, name: &str) -> Option<&str> {
        self.filters
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Flat pairs including `skip` and `limit`, ready for an HTTP client.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("skip".to_string(), self.skip.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        pairs.extend(self.filters.iter().cloned());
        pairs
    }
}

/// Body returned by list endpoints. Both members may be missing.
#[derive(Debug, Deserialize)]
pub struct RemotePage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<usize>,
}

impl<T> RemotePage<T> {
    /// Normalizes the body; a missing total is derived from what was received.
    pub fn into_page_result(self, query: &ListQuery) -> PageResult<T> {
        let received = query.skip.saturating_add(self.items.len());
        let total = match self.total {
            Some(total) if total >= received => total,
            Some(_) | None => {
                if self.items.is_empty() {
                    0
                } else {
                    received
                }
            }
        };
        PageResult::new(self.items, total)
    }
}

/// Remote collaborator returning one page of items.
pub trait ListFetcher<T> {
    fn fetch_page(&self, query: &ListQuery) -> FetchResult<PageResult<T>>;
}

impl<T, F: ListFetcher<T> + ?Sized> ListFetcher<T> for &F {
    fn fetch_page(&self, query: &ListQuery) -> FetchResult<PageResult<T>> {
        (**self).fetch_page(query)
    }
}
