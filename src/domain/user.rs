use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::filter::FilterSchema;
use crate::domain::sort::{ListItem, SortValue};
use crate::domain::types::{HubId, TypeConstraintError, UserId};

pub const SEARCH_FILTER: &str = "search";
pub const STATUS_FILTER: &str = "status";
pub const ROLE_FILTER: &str = "role";
pub const HUB_FILTER: &str = "hub_id";
pub const CREATED_FROM_FILTER: &str = "created_from";
pub const CREATED_TO_FILTER: &str = "created_to";

/// Value of choice filters meaning "no constraint".
pub const ANY_CHOICE: &str = "all";

/// Fields the users table can be sorted by.
pub const SORTABLE_FIELDS: &[&str] = &[
    "id",
    "hub_id",
    "name",
    "email",
    "status",
    "role",
    "created_at",
    "last_login_at",
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
    Pending,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Active, UserStatus::Blocked, UserStatus::Pending];

    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
            UserStatus::Pending => "pending",
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Member,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Manager, UserRole::Member];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Member => "member",
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown status `{s}`")))
    }
}

impl FromStr for UserRole {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown role `{s}`")))
    }
}

/// Row of the admin users table.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub hub_id: HubId,
    pub name: String,
    pub email: String,
    pub status: UserStatus,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub last_login_at: Option<NaiveDateTime>,
}

fn timestamp(value: NaiveDateTime) -> SortValue<'static> {
    SortValue::Text(Cow::Owned(value.format("%Y-%m-%dT%H:%M:%S").to_string()))
}

impl ListItem for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn sort_value(&self, field: &str) -> SortValue<'_> {
        match field {
            "id" => self.id.get().into(),
            "hub_id" => self.hub_id.get().into(),
            "name" => self.name.as_str().into(),
            "email" => self.email.as_str().into(),
            "status" => self.status.as_str().into(),
            "role" => self.role.as_str().into(),
            "created_at" => timestamp(self.created_at),
            "last_login_at" => self.last_login_at.map_or(SortValue::Null, timestamp),
            _ => SortValue::Null,
        }
    }
}

/// Filters understood by the users list.
pub fn users_filter_schema() -> FilterSchema {
    let statuses: Vec<&str> = std::iter::once(ANY_CHOICE)
        .chain(UserStatus::ALL.iter().map(|status| status.as_str()))
        .collect();
    let roles: Vec<&str> = std::iter::once(ANY_CHOICE)
        .chain(UserRole::ALL.iter().map(|role| role.as_str()))
        .collect();

    FilterSchema::new()
        .text(SEARCH_FILTER)
        .choice(STATUS_FILTER, &statuses, ANY_CHOICE)
        .choice(ROLE_FILTER, &roles, ANY_CHOICE)
        .integer(HUB_FILTER)
        .date_range(CREATED_FROM_FILTER, CREATED_TO_FILTER)
}
