//! List state coordinator.
//!
//! Keeps filter criteria and the page window in the URL query state, sort
//! order in local state, and the last fetched page in memory. Every change of
//! the `(filters, page)` tuple yields exactly one fetch keyed by that tuple;
//! responses whose key or generation no longer match are discarded, so the
//! coordinator works the same with synchronous and concurrent fetchers.
use crate::domain::accumulated::AccumulatedList;
use crate::domain::filter::{FilterCriteria, FilterPatch, FilterSchema};
use crate::domain::page::{PageRequest, PageResult, page_count};
use crate::domain::sort::{ListItem, SortSpec, sort_items};
use crate::domain::types::{PageIndex, PageSize};
use crate::dto::list::{ListStatus, ListView};
use crate::models::config::ListSettings;
use crate::notify::{AlertLevel, NotificationSink};
use crate::pagination::PageWindow;
use crate::query_state::{HistoryMode, QueryStateStore};
use crate::repository::errors::FetchResult;
use crate::repository::{ListFetcher, ListQuery};
use crate::services::{ServiceError, ServiceResult};

/// Query key holding the one-based page number.
pub const PAGE_KEY: &str = "page";
/// Query key holding the page size.
pub const PER_PAGE_KEY: &str = "per_page";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListMode {
    /// One page at a time with numbered controls.
    #[default]
    Paged,
    /// Pages are appended to each other ("load more").
    Accumulate,
}

/// Snapshot of what is being listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListState {
    pub filters: FilterCriteria,
    pub sort: SortSpec,
    pub page: PageRequest,
}

/// Identity of a fetch: the criteria and the window it was issued for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FetchKey {
    pub filters: FilterCriteria,
    pub page: PageRequest,
}

/// Handle of an issued fetch, returned to [`ListCoordinator::complete_fetch`].
#[derive(Clone, Debug)]
pub struct FetchTicket {
    generation: u64,
    key: FetchKey,
    query: ListQuery,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn key(&self) -> &FetchKey {
        &self.key
    }

    /// Parameters to send to the remote collaborator.
    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page replaced the previous one.
    Applied,
    /// The fetch failed; the previous page stays visible.
    Failed,
    /// The response belonged to superseded state and was dropped.
    Stale,
}

#[derive(Debug)]
struct Snapshot<T> {
    key: FetchKey,
    result: PageResult<T>,
}

pub struct ListCoordinator<T: ListItem, S, N> {
    schema: FilterSchema,
    store: S,
    sink: N,
    settings: ListSettings,
    mode: ListMode,
    sort: SortSpec,
    generation: u64,
    issued: Option<FetchKey>,
    pending: bool,
    force: bool,
    snapshot: Option<Snapshot<T>>,
    error: Option<String>,
    accumulated: AccumulatedList<T>,
    accumulated_for: Option<FilterCriteria>,
}

impl<T, S, N> ListCoordinator<T, S, N>
where
    T: ListItem + Clone,
    S: QueryStateStore,
    N: NotificationSink,
{
    pub fn new(schema: FilterSchema, store: S, sink: N, settings: ListSettings) -> Self {
        Self {
            schema,
            store,
            sink,
            settings,
            mode: ListMode::Paged,
            sort: SortSpec::default(),
            generation: 0,
            issued: None,
            pending: false,
            force: false,
            snapshot: None,
            error: None,
            accumulated: AccumulatedList::new(),
            accumulated_for: None,
        }
    }

    /// Switches to "load more" accumulation.
    pub fn accumulating(mut self) -> Self {
        self.mode = ListMode::Accumulate;
        self
    }

    pub fn mode(&self) -> ListMode {
        self.mode
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    pub fn state(&self) -> ListState {
        ListState {
            filters: self.filters(),
            sort: self.sort.clone(),
            page: self.page(),
        }
    }

    pub fn filters(&self) -> FilterCriteria {
        self.schema.decode(|key| self.store.get(key))
    }

    pub fn sort(&self) -> &SortSpec {
        &self.sort
    }

    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.page_index(), self.page_size())
    }

    fn page_index(&self) -> PageIndex {
        let Some(raw) = self.store.get(PAGE_KEY) else {
            return PageIndex::FIRST;
        };
        match raw.trim().parse::<usize>() {
            Ok(number) => PageIndex::from_number(number).unwrap_or_else(|err| {
                log::warn!("Ignoring page `{raw}`: {err}");
                PageIndex::FIRST
            }),
            Err(err) => {
                log::warn!("Ignoring page `{raw}`: {err}");
                PageIndex::FIRST
            }
        }
    }

    fn page_size(&self) -> PageSize {
        let Some(raw) = self.store.get(PER_PAGE_KEY) else {
            return self.settings.default_page_size;
        };
        let parsed = raw
            .trim()
            .parse::<usize>()
            .map_err(|err| err.to_string())
            .and_then(|value| PageSize::new(value).map_err(|err| err.to_string()));
        match parsed {
            Ok(size) => self.settings.clamp(size),
            Err(err) => {
                log::warn!("Ignoring page size `{raw}`: {err}");
                self.settings.default_page_size
            }
        }
    }

    fn fetch_key(&self) -> FetchKey {
        FetchKey {
            filters: self.filters(),
            page: self.page(),
        }
    }

    /// Merges `patch` into the filters and returns to the first page.
    ///
    /// Invalid input leaves every piece of state untouched.
    pub fn set_filters(&mut self, patch: FilterPatch) -> ServiceResult<()> {
        let current = self.filters();
        let next = self.schema.apply(&current, &patch).map_err(|err| {
            log::warn!("Rejected filters: {err}");
            ServiceError::from(err)
        })?;
        self.write_filters(&next);
        if next != current {
            self.criteria_changed();
        }
        Ok(())
    }

    /// Replaces the client-side sort. Neither the page nor the fetch key change.
    pub fn set_sort(&mut self, spec: SortSpec) {
        log::debug!("Sorting by `{spec}`");
        self.sort = spec;
    }

    pub fn set_page(&mut self, request: PageRequest) {
        let size = self.settings.clamp(request.size);
        let page = (request.index != PageIndex::FIRST).then(|| request.index.number().to_string());
        let per_page = (size != self.settings.default_page_size).then(|| size.to_string());
        self.store.set(
            vec![
                (PAGE_KEY.to_string(), page),
                (PER_PAGE_KEY.to_string(), per_page),
            ],
            HistoryMode::Push,
        );
    }

    /// Resets every filter to its default and returns to the first page,
    /// keeping the page size.
    pub fn clear_filters(&mut self) {
        let had_filters = !self.filters().is_empty();
        self.write_filters(&FilterCriteria::default());
        if had_filters {
            self.criteria_changed();
        }
    }

    /// Requests the page after the last applied one; `false` when nothing is
    /// left or a fetch is already in flight.
    pub fn load_more(&mut self) -> bool {
        if self.is_loading() {
            return false;
        }
        let current = self.fetch_key();
        let next = match &self.snapshot {
            Some(snapshot) if snapshot.key == current => {
                if !snapshot.result.has_more_after(&snapshot.key.page) {
                    return false;
                }
                snapshot.key.page.next()
            }
            _ => return false,
        };
        self.set_page(next);
        true
    }

    /// Issues a fetch for the current state unless one was already issued
    /// for the same key.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        let key = self.fetch_key();
        if !self.force && self.issued.as_ref() == Some(&key) {
            return None;
        }
        self.force = false;
        self.generation += 1;
        let query = ListQuery::from_state(&key.filters, &key.page);
        log::debug!(
            "Issuing fetch #{} skip={} limit={}",
            self.generation,
            query.skip,
            query.limit
        );
        self.issued = Some(key.clone());
        self.pending = true;
        Some(FetchTicket {
            generation: self.generation,
            key,
            query,
        })
    }

    /// Allows the current key to be fetched again, e.g. after a failure.
    pub fn reload(&mut self) {
        self.force = true;
    }

    /// Applies the outcome of a fetch issued by [`Self::begin_fetch`].
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: FetchResult<PageResult<T>>,
    ) -> FetchOutcome {
        let latest = ticket.generation == self.generation;
        if !latest || ticket.key != self.fetch_key() {
            log::debug!("Discarding stale response of fetch #{}", ticket.generation);
            if latest {
                self.pending = false;
            }
            return FetchOutcome::Stale;
        }
        self.pending = false;

        match result {
            Ok(mut page) => {
                let limit = ticket.key.page.limit();
                if page.items.len() > limit {
                    log::warn!(
                        "Fetch #{} returned {} items for a page of {limit}",
                        ticket.generation,
                        page.items.len()
                    );
                    page.items.truncate(limit);
                }
                if self.mode == ListMode::Accumulate {
                    self.accumulate(&ticket.key, &page.items);
                }
                self.error = None;
                self.snapshot = Some(Snapshot {
                    key: ticket.key,
                    result: page,
                });
                FetchOutcome::Applied
            }
            Err(err) => {
                log::error!("Failed to fetch list: {err}");
                let message = err.user_message();
                self.sink.notify(AlertLevel::Error, &message);
                self.error = Some(message);
                FetchOutcome::Failed
            }
        }
    }

    /// Runs one fetch through a synchronous collaborator, if one is due.
    pub fn refresh<F>(&mut self, fetcher: &F) -> Option<FetchOutcome>
    where
        F: ListFetcher<T> + ?Sized,
    {
        let ticket = self.begin_fetch()?;
        let result = fetcher.fetch_page(ticket.query());
        Some(self.complete_fetch(ticket, result))
    }

    /// `true` while a fetch for the current state is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending && self.issued.as_ref() == Some(&self.fetch_key())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> ListView<T> {
        let state = self.state();
        let (mut items, total, has_more) = match &self.snapshot {
            None => (Vec::new(), 0, false),
            Some(snapshot) => {
                let items = match self.mode {
                    ListMode::Paged => snapshot.result.items.clone(),
                    ListMode::Accumulate if self.accumulated_for.as_ref() == Some(&state.filters) => {
                        self.accumulated.items().to_vec()
                    }
                    ListMode::Accumulate => Vec::new(),
                };
                let has_more = snapshot.result.has_more_after(&snapshot.key.page);
                (items, snapshot.result.total, has_more)
            }
        };
        sort_items(&mut items, &self.sort);

        let loading = self.is_loading();
        // An error from a previous window does not mask the fetch of a new one.
        let showing_current = self.snapshot.as_ref().is_some_and(|snapshot| {
            snapshot.key.filters == state.filters && snapshot.key.page == state.page
        });
        let status = if loading && (self.error.is_none() || !showing_current) {
            ListStatus::Loading
        } else if self.error.is_some() {
            ListStatus::Error
        } else {
            match &self.snapshot {
                None => ListStatus::Idle,
                Some(snapshot) if snapshot.result.total == 0 && items.is_empty() => {
                    ListStatus::Empty
                }
                Some(_) => ListStatus::Ready,
            }
        };
        let pages = page_count(total, state.page.size);

        ListView {
            items,
            total,
            page_index: state.page.index.get(),
            page_size: state.page.size.get(),
            page_count: pages,
            pagination: PageWindow::new(state.page.index.number(), pages),
            has_more,
            loading,
            error: self.error.clone(),
            status,
            filters: state.filters,
            sort: self.sort.to_string(),
        }
    }

    fn write_filters(&mut self, criteria: &FilterCriteria) {
        let mut updates = self.schema.encode(criteria);
        updates.push((PAGE_KEY.to_string(), None));
        self.store.set(updates, HistoryMode::Push);
    }

    fn criteria_changed(&mut self) {
        self.error = None;
        self.accumulated.clear();
        self.accumulated_for = None;
    }

    fn accumulate(&mut self, key: &FetchKey, items: &[T]) {
        if key.page.index == PageIndex::FIRST
            || self.accumulated_for.as_ref() != Some(&key.filters)
        {
            self.accumulated.clear();
            self.accumulated_for = Some(key.filters.clone());
        }
        let added = self.accumulated.extend_page(items.iter().cloned());
        if added < items.len() {
            log::debug!(
                "Dropped {} duplicate items on page {}",
                items.len() - added,
                key.page.index
            );
        }
    }
}
