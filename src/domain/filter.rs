//! Filter criteria and the schema that declares them.
//!
//! A [`FilterSchema`] lists every filter a list view understands together with
//! its kind and default. [`FilterCriteria`] only ever stores values that differ
//! from their default, so two criteria describing the same constraints are
//! structurally equal and the URL never carries redundant keys.
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised while validating filter input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown filter `{0}`")]
    UnknownField(String),
    #[error("invalid value `{value}` for filter `{field}`")]
    InvalidValue { field: String, value: String },
    #[error("value `{value}` is not allowed for filter `{field}`")]
    NotAllowed { field: String, value: String },
    #[error("`{from}` must not be later than `{to}`")]
    InvalidRange { from: String, to: String },
}

/// Scalar value of a single filter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl FilterValue {
    /// Renders the value the way it is written to a query string.
    pub fn to_query_value(&self) -> String {
        match self {
            FilterValue::Text(text) => text.clone(),
            FilterValue::Integer(number) => number.to_string(),
            FilterValue::Date(date) => date.format(DATE_FORMAT).to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FilterValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_query_value())
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(value.into())
    }
}

impl From<NaiveDate> for FilterValue {
    fn from(value: NaiveDate) -> Self {
        FilterValue::Date(value)
    }
}

/// Kind of a declared filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterKind {
    /// Free-text value, trimmed; blank means unset.
    Text,
    /// Signed integer, typically a foreign-key identifier.
    Integer,
    /// Calendar date in `YYYY-MM-DD` form.
    Date,
    /// One of an enumerated set; `default` means unconstrained.
    Choice {
        allowed: Vec<String>,
        default: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterField {
    pub name: String,
    pub kind: FilterKind,
}

impl FilterField {
    /// Default value as written to the URL, if the kind has a visible one.
    pub fn default_value(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Choice { default, .. } => Some(default),
            _ => None,
        }
    }

    /// Parses a raw query value. Blank or default input yields `Ok(None)`.
    pub fn parse(&self, raw: &str) -> Result<Option<FilterValue>, FilterError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        let invalid = || FilterError::InvalidValue {
            field: self.name.clone(),
            value: raw.to_string(),
        };
        let value = match &self.kind {
            FilterKind::Text => FilterValue::Text(raw.to_string()),
            FilterKind::Integer => FilterValue::Integer(raw.parse().map_err(|_| invalid())?),
            FilterKind::Date => {
                FilterValue::Date(NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| invalid())?)
            }
            FilterKind::Choice { .. } => FilterValue::Text(raw.to_string()),
        };
        self.normalize(value)
    }

    /// Checks the value against the field kind and drops it if it equals the
    /// default.
    pub fn normalize(&self, value: FilterValue) -> Result<Option<FilterValue>, FilterError> {
        let mismatch = |value: &FilterValue| FilterError::InvalidValue {
            field: self.name.clone(),
            value: value.to_query_value(),
        };
        match (&self.kind, value) {
            (FilterKind::Text, FilterValue::Text(text)) => {
                let text = text.trim();
                Ok((!text.is_empty()).then(|| FilterValue::Text(text.to_string())))
            }
            (FilterKind::Integer, value @ FilterValue::Integer(_)) => Ok(Some(value)),
            (FilterKind::Date, value @ FilterValue::Date(_)) => Ok(Some(value)),
            (FilterKind::Choice { allowed, default }, FilterValue::Text(text)) => {
                let text = text.trim();
                if text.is_empty() || text == default {
                    Ok(None)
                } else if allowed.iter().any(|choice| choice == text) {
                    Ok(Some(FilterValue::Text(text.to_string())))
                } else {
                    Err(FilterError::NotAllowed {
                        field: self.name.clone(),
                        value: text.to_string(),
                    })
                }
            }
            (_, value) => Err(mismatch(&value)),
        }
    }
}

/// Named, optional constraints narrowing which items are listed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<String, FilterValue>);

impl FilterCriteria {
    pub fn get(&self, name: &str) -> Option<&FilterValue> {
        self.0.get(name)
    }

    /// `true` when every filter is at its default.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Flat `(key, value)` pairs of every non-default filter.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), value.to_query_value()))
            .collect()
    }

    fn put(&mut self, name: &str, value: Option<FilterValue>) {
        match value {
            Some(value) => {
                self.0.insert(name.to_string(), value);
            }
            None => {
                self.0.remove(name);
            }
        }
    }
}

/// Partial update of [`FilterCriteria`]; `None` unsets a field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterPatch(Vec<(String, Option<FilterValue>)>);

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.0.push((name.into(), Some(value.into())));
        self
    }

    pub fn unset(mut self, name: impl Into<String>) -> Self {
        self.0.push((name.into(), None));
        self
    }

    pub fn maybe<V: Into<FilterValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.set(name, value),
            None => self.unset(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&FilterValue>)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }
}

/// Declared filters of one list view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSchema {
    fields: Vec<FilterField>,
    ranges: Vec<(String, String)>,
}

impl FilterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn field_of(mut self, name: &str, kind: FilterKind) -> Self {
        self.fields.push(FilterField {
            name: name.to_string(),
            kind,
        });
        self
    }

    pub fn text(self, name: &str) -> Self {
        self.field_of(name, FilterKind::Text)
    }

    pub fn integer(self, name: &str) -> Self {
        self.field_of(name, FilterKind::Integer)
    }

    pub fn date(self, name: &str) -> Self {
        self.field_of(name, FilterKind::Date)
    }

    pub fn choice(self, name: &str, allowed: &[&str], default: &str) -> Self {
        let kind = FilterKind::Choice {
            allowed: allowed.iter().map(|choice| choice.to_string()).collect(),
            default: default.to_string(),
        };
        self.field_of(name, kind)
    }

    /// Declares two date fields bounding a range; `from` must not exceed `to`.
    pub fn date_range(self, from: &str, to: &str) -> Self {
        let mut schema = self.date(from).date(to);
        schema.ranges.push((from.to_string(), to.to_string()));
        schema
    }

    pub fn field(&self, name: &str) -> Option<&FilterField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    /// Merges `patch` into `base`, returning the validated result.
    pub fn apply(
        &self,
        base: &FilterCriteria,
        patch: &FilterPatch,
    ) -> Result<FilterCriteria, FilterError> {
        let mut next = base.clone();
        for (name, value) in patch.iter() {
            let field = self
                .field(name)
                .ok_or_else(|| FilterError::UnknownField(name.to_string()))?;
            let value = match value {
                Some(value) => field.normalize(value.clone())?,
                None => None,
            };
            next.put(&field.name, value);
        }
        self.validate(&next)?;
        Ok(next)
    }

    /// Checks cross-field constraints such as date ranges.
    pub fn validate(&self, criteria: &FilterCriteria) -> Result<(), FilterError> {
        for (from, to) in &self.ranges {
            if let (Some(FilterValue::Date(start)), Some(FilterValue::Date(end))) =
                (criteria.get(from), criteria.get(to))
                && start > end
            {
                return Err(FilterError::InvalidRange {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
        Ok(())
    }

    /// Reads criteria through `lookup`. Malformed values fall back to their
    /// default.
    pub fn decode<F>(&self, lookup: F) -> FilterCriteria
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut criteria = FilterCriteria::default();
        for field in &self.fields {
            let Some(raw) = lookup(&field.name) else {
                continue;
            };
            match field.parse(&raw) {
                Ok(value) => criteria.put(&field.name, value),
                Err(err) => log::warn!("Ignoring query value: {err}"),
            }
        }
        if let Err(err) = self.validate(&criteria) {
            log::warn!("Ignoring inverted range in query: {err}");
            for (_, to) in &self.ranges {
                criteria.put(to, None);
            }
        }
        criteria
    }

    /// Key updates writing `criteria` to a query store. Fields at their
    /// default map to `None` so the store drops them.
    pub fn encode(&self, criteria: &FilterCriteria) -> Vec<(String, Option<String>)> {
        self.fields
            .iter()
            .map(|field| {
                let value = criteria.get(&field.name).map(FilterValue::to_query_value);
                (field.name.clone(), value)
            })
            .collect()
    }
}
