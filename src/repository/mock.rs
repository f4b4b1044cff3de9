//! Mock collaborators for isolating the coordinator in tests.

use mockall::mock;

use crate::domain::page::PageResult;
use crate::domain::user::User;
use crate::notify::{AlertLevel, NotificationSink};
use crate::query_state::{HistoryMode, QueryStateStore};
use crate::repository::errors::FetchResult;
use crate::repository::{ListFetcher, ListQuery};

mock! {
    pub UserFetcher {}

    impl ListFetcher<User> for UserFetcher {
        fn fetch_page(&self, query: &ListQuery) -> FetchResult<PageResult<User>>;
    }
}

mock! {
    pub Sink {}

    impl NotificationSink for Sink {
        fn notify(&self, level: AlertLevel, message: &str);
    }
}

mock! {
    pub QueryStore {}

    impl QueryStateStore for QueryStore {
        fn get(&self, key: &str) -> Option<String>;
        fn set(&mut self, updates: Vec<(String, Option<String>)>, mode: HistoryMode);
        fn to_query_string(&self) -> String;
    }
}
