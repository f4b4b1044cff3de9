//! URL query-string state.
//!
//! The coordinator never touches a browser location directly. It reads and
//! writes keys through [`QueryStateStore`]; [`UrlQueryState`] is the in-memory
//! implementation used by the HTTP front-end and by tests.
use std::collections::BTreeMap;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("malformed query string: {0}")]
pub struct MalformedQuery(String);

/// How a change is recorded in the navigation history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryMode {
    /// Adds a new entry; "back" returns to the previous state.
    Push,
    /// Overwrites the current entry.
    Replace,
}

pub trait QueryStateStore {
    /// Current value of `key`, `None` when absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Applies every update at once. `None` removes the key.
    fn set(&mut self, updates: Vec<(String, Option<String>)>, mode: HistoryMode);

    /// Canonical query string without the leading `?`.
    fn to_query_string(&self) -> String;
}

type Listener = Box<dyn Fn(&str) + Send + Sync>;

/// Blank values are dropped and the last occurrence of a repeated key wins.
fn decode_params(query: &str) -> Result<BTreeMap<String, String>, MalformedQuery> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> =
        serde_html_form::from_str(query).map_err(|err| MalformedQuery(err.to_string()))?;
    Ok(pairs
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .collect())
}

/// Query state backed by an ordered map with a navigation history.
#[derive(Default)]
pub struct UrlQueryState {
    params: BTreeMap<String, String>,
    history: Vec<String>,
    listeners: Vec<Listener>,
}

impl UrlQueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query string (with or without `?`). Blank values are dropped
    /// and the last occurrence of a repeated key wins.
    pub fn parse(query: &str) -> Result<Self, MalformedQuery> {
        let mut state = Self {
            params: decode_params(query)?,
            ..Self::default()
        };
        state.history.push(state.to_query_string());
        Ok(state)
    }

    /// Registers a callback receiving the new query string after each change.
    pub fn subscribe(&mut self, listener: impl Fn(&str) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Recorded entries, oldest first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Returns to the previous history entry, if any.
    pub fn back(&mut self) -> bool {
        if self.history.len() < 2 {
            return false;
        }
        self.history.pop();
        let previous = self.history.last().cloned().unwrap_or_default();
        match decode_params(&previous) {
            Ok(params) => {
                self.params = params;
                self.notify();
                true
            }
            Err(err) => {
                log::error!("Failed to restore history entry `{previous}`: {err}");
                false
            }
        }
    }

    fn notify(&self) {
        let query = self.to_query_string();
        for listener in &self.listeners {
            listener(&query);
        }
    }
}

impl QueryStateStore for UrlQueryState {
    fn get(&self, key: &str) -> Option<String> {
        self.params.get(key).cloned()
    }

    fn set(&mut self, updates: Vec<(String, Option<String>)>, mode: HistoryMode) {
        let before = self.params.clone();
        for (key, value) in updates {
            match value.filter(|value| !value.trim().is_empty()) {
                Some(value) => {
                    self.params.insert(key, value);
                }
                None => {
                    self.params.remove(&key);
                }
            }
        }
        if self.params == before {
            return;
        }

        let query = self.to_query_string();
        match mode {
            HistoryMode::Push => self.history.push(query),
            HistoryMode::Replace => match self.history.last_mut() {
                Some(current) => *current = query,
                None => self.history.push(query),
            },
        }
        self.notify();
    }

    fn to_query_string(&self) -> String {
        serde_html_form::to_string(&self.params).unwrap_or_else(|err| {
            log::error!("Failed to encode query state: {err}");
            String::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn update(key: &str, value: Option<&str>) -> (String, Option<String>) {
        (key.to_string(), value.map(str::to_string))
    }

    #[test]
    fn parses_and_drops_blank_values() {
        let state = UrlQueryState::parse("?search=paris+north&status=&page=2").unwrap();

        assert_eq!(state.get("search").as_deref(), Some("paris north"));
        assert_eq!(state.get("status"), None);
        assert_eq!(state.to_query_string(), "page=2&search=paris+north");
    }

    #[test]
    fn push_and_replace_record_history() {
        let mut state = UrlQueryState::parse("").unwrap();

        state.set(vec![update("search", Some("a"))], HistoryMode::Push);
        state.set(vec![update("page", Some("3"))], HistoryMode::Replace);
        state.set(vec![update("search", None)], HistoryMode::Push);

        assert_eq!(state.history(), &["", "page=3&search=a", "page=3"]);
    }

    #[test]
    fn unchanged_state_is_not_recorded() {
        let mut state = UrlQueryState::parse("search=a").unwrap();

        state.set(vec![update("search", Some("a")), update("page", None)], HistoryMode::Push);

        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn back_restores_previous_entry() {
        let mut state = UrlQueryState::parse("search=a").unwrap();
        state.set(vec![update("search", Some("b"))], HistoryMode::Push);

        assert!(state.back());
        assert_eq!(state.get("search").as_deref(), Some("a"));
        assert!(!state.back());
    }

    #[test]
    fn back_drops_blank_values_like_parse() {
        let mut state = UrlQueryState::parse("search=a").unwrap();
        state.history.insert(0, "search=+&status=active".to_string());
        state.set(vec![update("search", Some("b"))], HistoryMode::Replace);

        assert!(state.back());
        assert_eq!(state.get("search"), None);
        assert_eq!(state.to_query_string(), "status=active");
    }

    #[test]
    fn listeners_see_every_change() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut state = UrlQueryState::new();
        state.subscribe(move |query| sink.lock().unwrap().push(query.to_string()));

        state.set(vec![update("status", Some("active"))], HistoryMode::Push);
        state.set(vec![update("status", Some("active"))], HistoryMode::Push);
        state.set(vec![update("status", None)], HistoryMode::Replace);

        assert_eq!(*seen.lock().unwrap(), vec!["status=active".to_string(), String::new()]);
    }
}
