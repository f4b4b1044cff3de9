//! In-memory users directory answering list queries.
use std::str::FromStr;

use chrono::NaiveDate;

use crate::domain::page::PageResult;
use crate::domain::user::{
    CREATED_FROM_FILTER, CREATED_TO_FILTER, HUB_FILTER, ROLE_FILTER, SEARCH_FILTER, STATUS_FILTER,
    User, UserRole, UserStatus,
};
use crate::repository::errors::{FetchError, FetchResult};
use crate::repository::{ListFetcher, ListQuery};

/// Read-only set of users, returned in ascending id order.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

fn rejected(name: &str, value: &str) -> FetchError {
    FetchError::Remote {
        status: 400,
        message: format!("invalid value `{value}` for `{name}`"),
    }
}

fn parse_param<T: FromStr>(query: &ListQuery, name: &str) -> FetchResult<Option<T>> {
    query
        .filter_value(name)
        .map(|value| value.parse().map_err(|_| rejected(name, value)))
        .transpose()
}

fn parse_date(query: &ListQuery, name: &str) -> FetchResult<Option<NaiveDate>> {
    query
        .filter_value(name)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| rejected(name, value))
        })
        .transpose()
}

/// Predicate built from the query filters.
struct UserFilter {
    search: Option<String>,
    status: Option<UserStatus>,
    role: Option<UserRole>,
    hub_id: Option<i32>,
    created_from: Option<NaiveDate>,
    created_to: Option<NaiveDate>,
}

impl UserFilter {
    fn from_query(query: &ListQuery) -> FetchResult<Self> {
        Ok(Self {
            search: query
                .filter_value(SEARCH_FILTER)
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty()),
            status: parse_param(query, STATUS_FILTER)?,
            role: parse_param(query, ROLE_FILTER)?,
            hub_id: parse_param(query, HUB_FILTER)?,
            created_from: parse_date(query, CREATED_FROM_FILTER)?,
            created_to: parse_date(query, CREATED_TO_FILTER)?,
        })
    }

    fn matches(&self, user: &User) -> bool {
        let created = user.created_at.date();
        self.search.as_ref().is_none_or(|term| {
            user.name.to_lowercase().contains(term) || user.email.to_lowercase().contains(term)
        }) && self.status.is_none_or(|status| user.status == status)
            && self.role.is_none_or(|role| user.role == role)
            && self.hub_id.is_none_or(|hub_id| user.hub_id.get() == hub_id)
            && self.created_from.is_none_or(|from| created >= from)
            && self.created_to.is_none_or(|to| created <= to)
    }
}

impl UserDirectory {
    pub fn new(mut users: Vec<User>) -> Self {
        users.sort_by_key(|user| user.id);
        Self { users }
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Loads users from CSV with a header row matching the [`User`] fields.
    #[cfg(feature = "server")]
    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::Reader::from_reader(reader);
        let users = rdr.deserialize().collect::<Result<Vec<User>, _>>()?;
        Ok(Self::new(users))
    }

    #[cfg(feature = "server")]
    pub fn from_csv_path(path: impl AsRef<std::path::Path>) -> Result<Self, csv::Error> {
        let file = std::fs::File::open(path)?;
        Self::from_csv_reader(file)
    }
}

impl ListFetcher<User> for UserDirectory {
    fn fetch_page(&self, query: &ListQuery) -> FetchResult<PageResult<User>> {
        let filter = UserFilter::from_query(query)?;
        let matching: Vec<&User> = self.users.iter().filter(|user| filter.matches(user)).collect();
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(query.skip)
            .take(query.limit)
            .cloned()
            .collect();
        log::debug!(
            "Listed users skip={} limit={} total={total}",
            query.skip,
            query.limit
        );
        Ok(PageResult::new(items, total))
    }
}
