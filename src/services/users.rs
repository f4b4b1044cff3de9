use validator::Validate;

use crate::domain::sort::SortSpec;
use crate::domain::user::{SORTABLE_FIELDS, User, users_filter_schema};
use crate::dto::list::ListView;
use crate::forms::users::UserFilterForm;
use crate::models::config::ListSettings;
use crate::notify::{LogSink, NotificationSink};
use crate::query_state::{QueryStateStore, UrlQueryState};
use crate::repository::ListFetcher;
use crate::services::coordinator::ListCoordinator;
use crate::services::{ServiceError, ServiceResult};

/// Request key carrying the client-side sort. The coordinator never writes it.
pub const SORT_KEY: &str = "sort";

pub type UsersCoordinator<S, N> = ListCoordinator<User, S, N>;

/// Coordinator for the admin users table.
pub fn users_coordinator<S, N>(store: S, sink: N, settings: ListSettings) -> UsersCoordinator<S, N>
where
    S: QueryStateStore,
    N: NotificationSink,
{
    ListCoordinator::new(users_filter_schema(), store, sink, settings)
}

/// Parses a sort parameter, accepting only sortable user fields.
pub fn parse_users_sort(raw: Option<&str>) -> ServiceResult<SortSpec> {
    let Some(raw) = raw else {
        return Ok(SortSpec::default());
    };
    let spec: SortSpec = raw.parse()?;
    if let Some(key) = spec
        .keys()
        .iter()
        .find(|key| !SORTABLE_FIELDS.contains(&key.field.as_str()))
    {
        return Err(ServiceError::Validation(format!(
            "cannot sort by `{}`",
            key.field
        )));
    }
    Ok(spec)
}

/// Loads the users page described by a URL query string.
pub fn load_users_page<F>(
    fetcher: &F,
    query: &str,
    settings: ListSettings,
) -> ServiceResult<ListView<User>>
where
    F: ListFetcher<User> + ?Sized,
{
    let store = UrlQueryState::parse(query)?;
    let sort = parse_users_sort(store.get(SORT_KEY).as_deref())?;

    let mut coordinator = users_coordinator(store, LogSink, settings);
    coordinator.set_sort(sort);
    coordinator.refresh(fetcher);

    Ok(coordinator.view())
}

/// Applies a submitted filter form on top of `query` and returns the query
/// string to navigate to.
pub fn apply_users_filters(
    query: &str,
    form: &UserFilterForm,
    settings: ListSettings,
) -> ServiceResult<String> {
    if let Err(err) = form.validate() {
        log::error!("Failed to validate form: {err}");
        return Err(ServiceError::Form(err.to_string()));
    }

    let store = UrlQueryState::parse(query)?;
    let mut coordinator = users_coordinator(store, LogSink, settings);
    coordinator.set_filters(form.to_patch())?;

    Ok(coordinator.store().to_query_string())
}

/// Drops every filter from `query`, keeping the page size.
pub fn clear_users_filters(query: &str, settings: ListSettings) -> ServiceResult<String> {
    let store = UrlQueryState::parse(query)?;
    let mut coordinator = users_coordinator(store, LogSink, settings);
    coordinator.clear_filters();

    Ok(coordinator.store().to_query_string())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::domain::page::PageResult;
    use crate::domain::types::{HubId, UserId};
    use crate::domain::user::{UserRole, UserStatus};
    use crate::dto::list::ListStatus;
    use crate::repository::ListQuery;
    use crate::repository::errors::{FetchError, FetchResult};

    #[derive(Default)]
    struct RecordingFetcher {
        queries: RefCell<Vec<ListQuery>>,
        fail: bool,
    }

    fn user(id: i32, name: &str) -> User {
        User {
            id: UserId::new(id).unwrap(),
            hub_id: HubId::new(1).unwrap(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            status: UserStatus::Active,
            role: UserRole::Member,
            created_at: NaiveDate::from_ymd_opt(2024, 1, id as u32)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
            last_login_at: None,
        }
    }

    impl ListFetcher<User> for RecordingFetcher {
        fn fetch_page(&self, query: &ListQuery) -> FetchResult<PageResult<User>> {
            self.queries.borrow_mut().push(query.clone());
            if self.fail {
                return Err(FetchError::Network("connection reset".into()));
            }
            Ok(PageResult::new(vec![user(1, "Zoe"), user(2, "Adam")], 42))
        }
    }

    #[test]
    fn load_maps_url_state_to_remote_query() {
        let fetcher = RecordingFetcher::default();

        let view = load_users_page(
            &fetcher,
            "search=ann&status=active&page=3&per_page=10&sort=name:asc",
            ListSettings::default(),
        )
        .unwrap();

        let queries = fetcher.queries.borrow();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].skip, 20);
        assert_eq!(queries[0].limit, 10);
        assert_eq!(queries[0].filter_value("search"), Some("ann"));
        assert_eq!(queries[0].filter_value("status"), Some("active"));
        assert_eq!(view.items[0].name, "Adam");
        assert_eq!(view.page_count, 5);
        assert_eq!(view.status, ListStatus::Ready);
    }

    #[test]
    fn load_reports_fetch_failure_in_view() {
        let fetcher = RecordingFetcher {
            fail: true,
            ..RecordingFetcher::default()
        };

        let view = load_users_page(&fetcher, "", ListSettings::default()).unwrap();

        assert_eq!(view.status, ListStatus::Error);
        assert!(view.items.is_empty());
        assert!(view.error.is_some());
    }

    #[test]
    fn huge_page_number_saturates() {
        let fetcher = RecordingFetcher::default();
        let query = format!("page={}", usize::MAX);

        let view = load_users_page(&fetcher, &query, ListSettings::default()).unwrap();

        assert_eq!(fetcher.queries.borrow()[0].skip, usize::MAX);
        assert_eq!(view.pagination.page, usize::MAX);
        assert_eq!(view.page_count, 3);
        assert!(!view.has_more);
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let result = parse_users_sort(Some("password:asc"));

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn apply_filters_resets_page_and_keeps_sort_param() {
        let form = UserFilterForm {
            search: Some("paris".to_string()),
            status: Some("blocked".to_string()),
            ..UserFilterForm::default()
        };

        let query =
            apply_users_filters("page=4&per_page=50&sort=name", &form, ListSettings::default())
                .unwrap();

        assert_eq!(query, "per_page=50&search=paris&sort=name&status=blocked");
    }

    #[test]
    fn apply_filters_rejects_unknown_status() {
        let form = UserFilterForm {
            status: Some("deleted".to_string()),
            ..UserFilterForm::default()
        };

        let result = apply_users_filters("", &form, ListSettings::default());

        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[test]
    fn clear_filters_keeps_page_size() {
        let query =
            clear_users_filters("search=a&role=admin&page=2&per_page=50", ListSettings::default())
                .unwrap();

        assert_eq!(query, "per_page=50");
    }
}
