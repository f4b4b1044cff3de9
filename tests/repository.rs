use std::io::Write;

use pushkind_listing::repository::errors::FetchError;
use pushkind_listing::repository::memory::UserDirectory;
use pushkind_listing::repository::{ListFetcher, ListQuery};

mod common;

fn names(directory: &UserDirectory, query: ListQuery) -> (usize, Vec<String>) {
    let page = directory.fetch_page(&query).unwrap();
    (
        page.total,
        page.items.into_iter().map(|user| user.name).collect(),
    )
}

#[test]
fn test_directory_pages_by_skip_and_limit() {
    let directory = UserDirectory::new(common::sample_users());

    assert_eq!(
        names(&directory, ListQuery::new(0, 2)),
        (5, vec!["Anna".to_string(), "Boris".to_string()])
    );
    assert_eq!(
        names(&directory, ListQuery::new(4, 2)),
        (5, vec!["Elena".to_string()])
    );
    assert_eq!(names(&directory, ListQuery::new(10, 2)), (5, vec![]));
}

#[test]
fn test_directory_returns_users_in_id_order() {
    let mut users = common::sample_users();
    users.reverse();
    let directory = UserDirectory::new(users);

    let (_, listed) = names(&directory, ListQuery::new(0, 5));

    assert_eq!(listed, vec!["Anna", "Boris", "Clara", "Dmitri", "Elena"]);
}

#[test]
fn test_directory_search_is_case_insensitive() {
    let directory = UserDirectory::new(common::sample_users());

    let (total, listed) = names(&directory, ListQuery::new(0, 10).filter("search", " CLARA "));
    assert_eq!(total, 1);
    assert_eq!(listed, vec!["Clara"]);

    let (total, _) = names(&directory, ListQuery::new(0, 10).filter("search", "example.com"));
    assert_eq!(total, 5);
}

#[test]
fn test_directory_combines_filters() {
    let directory = UserDirectory::new(common::sample_users());

    let (total, listed) = names(
        &directory,
        ListQuery::new(0, 10)
            .filter("status", "active")
            .filter("hub_id", "1"),
    );
    assert_eq!(total, 2);
    assert_eq!(listed, vec!["Anna", "Dmitri"]);

    let (total, listed) = names(&directory, ListQuery::new(0, 10).filter("role", "member"));
    assert_eq!(total, 3);
    assert_eq!(listed, vec!["Boris", "Clara", "Elena"]);
}

#[test]
fn test_directory_filters_by_creation_range() {
    let directory = UserDirectory::new(common::sample_users());

    let (total, listed) = names(
        &directory,
        ListQuery::new(0, 10)
            .filter("created_from", "2024-02-10")
            .filter("created_to", "2024-04-10"),
    );

    assert_eq!(total, 3);
    assert_eq!(listed, vec!["Boris", "Clara", "Dmitri"]);
}

#[test]
fn test_directory_rejects_malformed_filters() {
    let directory = UserDirectory::new(common::sample_users());

    let result = directory.fetch_page(&ListQuery::new(0, 10).filter("status", "deleted"));

    assert!(matches!(result, Err(FetchError::Remote { status: 400, .. })));
}

#[test]
fn test_directory_loads_from_csv() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "id,hub_id,name,email,status,role,created_at,last_login_at\n\
         2,1,Boris,boris@example.com,blocked,member,2024-02-10T12:00:00,\n\
         1,1,Anna,anna@example.com,active,admin,2024-01-10T12:00:00,2025-03-01T08:30:00"
    )
    .unwrap();

    let directory = UserDirectory::from_csv_path(file.path()).unwrap();
    let page = directory.fetch_page(&ListQuery::new(0, 10)).unwrap();

    assert_eq!(directory.len(), 2);
    assert_eq!(page.items[0].name, "Anna");
    assert!(page.items[0].last_login_at.is_some());
    assert!(page.items[1].last_login_at.is_none());
}

#[test]
fn test_directory_rejects_malformed_csv() {
    let csv = "id,hub_id,name,email,status,role,created_at,last_login_at\n\
               1,1,Anna,anna@example.com,sleeping,admin,2024-01-10T12:00:00,\n";

    assert!(UserDirectory::from_csv_reader(csv.as_bytes()).is_err());
}
