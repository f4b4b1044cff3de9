//! Client-side ordering of a fetched page.
//!
//! Sorting is a convenience applied after the server has already chosen which
//! items belong to the page. It never leaves the current page and never
//! triggers a fetch.
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::TypeConstraintError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown sort direction `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

/// Ordered tie-break rules; the first key is the primary one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(Vec<SortKey>);

impl SortSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by(field: impl Into<String>, direction: SortDirection) -> Self {
        Self::new().then(field, direction)
    }

    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.0.push(SortKey {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses `name:asc,created_at:desc`. A key without a direction is ascending.
impl FromStr for SortSpec {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut spec = SortSpec::new();
        for part in s.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (field, direction) = match part.split_once(':') {
                Some((field, direction)) => (field.trim(), direction.parse()?),
                None => (part, SortDirection::Ascending),
            };
            if field.is_empty() {
                return Err(TypeConstraintError::EmptyString);
            }
            spec = spec.then(field, direction);
        }
        Ok(spec)
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|key| format!("{}:{}", key.field, key.direction.as_str()))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Value of one item field as seen by the comparator.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue<'a> {
    Null,
    Text(Cow<'a, str>),
    Number(f64),
    Bool(bool),
}

impl SortValue<'_> {
    fn coerce(&self) -> Cow<'_, str> {
        match self {
            SortValue::Null => Cow::Borrowed(""),
            SortValue::Text(text) => Cow::Borrowed(text.as_ref()),
            SortValue::Number(number) => Cow::Owned(number.to_string()),
            SortValue::Bool(flag) => Cow::Owned(flag.to_string()),
        }
    }
}

impl<'a> From<&'a str> for SortValue<'a> {
    fn from(value: &'a str) -> Self {
        SortValue::Text(Cow::Borrowed(value))
    }
}

impl<'a, T> From<Option<T>> for SortValue<'a>
where
    T: Into<SortValue<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(SortValue::Null, Into::into)
    }
}

impl From<i32> for SortValue<'_> {
    fn from(value: i32) -> Self {
        SortValue::Number(value.into())
    }
}

impl From<i64> for SortValue<'_> {
    fn from(value: i64) -> Self {
        SortValue::Number(value as f64)
    }
}

impl From<f64> for SortValue<'_> {
    fn from(value: f64) -> Self {
        SortValue::Number(value)
    }
}

/// An item that can be listed, sorted and de-duplicated.
pub trait ListItem {
    type Id: Eq + Hash + Clone;

    /// Primary key used for de-duplication.
    fn id(&self) -> Self::Id;

    /// Value of the named field; unknown fields are [`SortValue::Null`].
    fn sort_value(&self, field: &str) -> SortValue<'_>;
}

/// JSON objects keyed by their `id` member.
impl ListItem for Value {
    type Id = String;

    fn id(&self) -> String {
        match self.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(id) => id.to_string(),
            None => self.to_string(),
        }
    }

    fn sort_value(&self, field: &str) -> SortValue<'_> {
        match self.get(field) {
            None | Some(Value::Null) => SortValue::Null,
            Some(Value::String(text)) => SortValue::Text(Cow::Borrowed(text.as_str())),
            Some(Value::Number(number)) => {
                number.as_f64().map_or(SortValue::Null, SortValue::Number)
            }
            Some(Value::Bool(flag)) => SortValue::Bool(*flag),
            Some(other) => SortValue::Text(Cow::Owned(other.to_string())),
        }
    }
}

fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 10
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// Milliseconds since the epoch for ISO-8601-like strings.
fn parse_timestamp(text: &str) -> Option<i64> {
    if !looks_like_date(text) {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.timestamp_millis());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// How the non-null values of one field are compared across a whole slice.
///
/// Picking the mode per slice rather than per pair keeps the comparator a
/// total order when a column mixes types: numbers compare numerically only if
/// every value is a number, otherwise the column falls back to strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareMode {
    Numeric,
    Boolean,
    /// Every value is an ISO-8601-like date or timestamp.
    Timestamp,
    Text,
}

impl CompareMode {
    pub fn detect<'a, T, I>(items: I, field: &str) -> Self
    where
        T: ListItem + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let (mut numeric, mut boolean, mut timestamp) = (true, true, true);
        for item in items {
            match item.sort_value(field) {
                SortValue::Null => {}
                SortValue::Number(_) => {
                    boolean = false;
                    timestamp = false;
                }
                SortValue::Bool(_) => {
                    numeric = false;
                    timestamp = false;
                }
                SortValue::Text(text) => {
                    numeric = false;
                    boolean = false;
                    timestamp = timestamp && parse_timestamp(&text).is_some();
                }
            }
            if !(numeric || boolean || timestamp) {
                return CompareMode::Text;
            }
        }
        if numeric {
            CompareMode::Numeric
        } else if boolean {
            CompareMode::Boolean
        } else if timestamp {
            CompareMode::Timestamp
        } else {
            CompareMode::Text
        }
    }
}

/// Ascending comparison of two non-null values under `mode`.
pub fn compare_values(a: &SortValue<'_>, b: &SortValue<'_>, mode: CompareMode) -> Ordering {
    match (mode, a, b) {
        (CompareMode::Numeric, SortValue::Number(left), SortValue::Number(right)) => {
            left.total_cmp(right)
        }
        (CompareMode::Boolean, SortValue::Bool(left), SortValue::Bool(right)) => left.cmp(right),
        (CompareMode::Timestamp, SortValue::Text(left), SortValue::Text(right)) => {
            match (parse_timestamp(left), parse_timestamp(right)) {
                (Some(left), Some(right)) => left.cmp(&right),
                _ => compare_text(left, right),
            }
        }
        _ => compare_text(&a.coerce(), &b.coerce()),
    }
}

/// Compares two items under `spec`, one mode per key. Nulls go last in
/// either direction.
fn compare_items<T: ListItem>(a: &T, b: &T, spec: &SortSpec, modes: &[CompareMode]) -> Ordering {
    for (key, mode) in spec.keys().iter().zip(modes) {
        let left = a.sort_value(&key.field);
        let right = b.sort_value(&key.field);
        let ordering = match (&left, &right) {
            (SortValue::Null, SortValue::Null) => Ordering::Equal,
            (SortValue::Null, _) => Ordering::Greater,
            (_, SortValue::Null) => Ordering::Less,
            _ => match key.direction {
                SortDirection::Ascending => compare_values(&left, &right, *mode),
                SortDirection::Descending => compare_values(&right, &left, *mode),
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Stable in-place sort; an empty spec leaves the server order untouched.
pub fn sort_items<T: ListItem>(items: &mut [T], spec: &SortSpec) {
    if spec.is_empty() {
        return;
    }
    let modes: Vec<CompareMode> = spec
        .keys()
        .iter()
        .map(|key| CompareMode::detect(items.iter(), &key.field))
        .collect();
    items.sort_by(|a, b| compare_items(a, b, spec, &modes));
}
