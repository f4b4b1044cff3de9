#![allow(dead_code)]

use chrono::NaiveDate;
use pushkind_listing::domain::types::{HubId, UserId};
use pushkind_listing::domain::user::{User, UserRole, UserStatus};

pub fn user(
    id: i32,
    hub_id: i32,
    name: &str,
    status: UserStatus,
    role: UserRole,
    created: (i32, u32, u32),
) -> User {
    let (year, month, day) = created;
    User {
        id: UserId::new(id).unwrap(),
        hub_id: HubId::new(hub_id).unwrap(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        status,
        role,
        created_at: NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        last_login_at: None,
    }
}

/// Five users spread over two hubs, created one month apart.
pub fn sample_users() -> Vec<User> {
    vec![
        user(1, 1, "Anna", UserStatus::Active, UserRole::Admin, (2024, 1, 10)),
        user(2, 1, "Boris", UserStatus::Blocked, UserRole::Member, (2024, 2, 10)),
        user(3, 2, "Clara", UserStatus::Active, UserRole::Member, (2024, 3, 10)),
        user(4, 1, "Dmitri", UserStatus::Active, UserRole::Manager, (2024, 4, 10)),
        user(5, 1, "Elena", UserStatus::Pending, UserRole::Member, (2024, 5, 10)),
    ]
}
