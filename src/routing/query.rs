//! Query-string parsing and per-route allow-list validation.
//!
//! Query strings are attacker-controlled input into page state (redirect
//! targets, pre-filled forms), so each route accepts a closed set of keys and
//! one unknown key rejects the whole navigation. Unparseable input is a
//! rejection, never a panic.

#[cfg(test)]
#[path = "query_test.rs"]
mod query_test;

use std::borrow::Cow;

use super::routes::RouteTable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("query parameter with empty key")]
    EmptyKey,

    #[error("query component is not valid UTF-8: {0}")]
    Encoding(String),
}

fn decode(component: &str) -> Result<String, QueryError> {
    let spaced: Cow<'_, str> = if component.contains('+') {
        Cow::Owned(component.replace('+', " "))
    } else {
        Cow::Borrowed(component)
    };
    urlencoding::decode(&spaced)
        .map(Cow::into_owned)
        .map_err(|_| QueryError::Encoding(component.to_owned()))
}

/// Decoded query parameters in source order; duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2`, with or without a leading `?`. Empty segments are
    /// skipped and a key without `=` gets an empty value.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] for an empty key or undecodable escapes.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut pairs = Vec::new();
        for segment in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            let key = decode(key)?;
            if key.is_empty() {
                return Err(QueryError::EmptyKey);
            }
            pairs.push((key, decode(value)?));
        }
        Ok(Self(pairs))
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// First value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Percent-encoded `a=1&b=2`, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Outcome of allow-list validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    Accepted,
    /// Carries the first offending key, or `None` when the query was malformed.
    Rejected { key: Option<String> },
}

impl Validation {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Accept iff every key is on `path`'s allow-list. An empty key set is
/// always accepted.
pub fn validate<'a>(table: &RouteTable, path: &str, keys: impl IntoIterator<Item = &'a str>) -> Validation {
    let allowed = table.allowed_query_keys(path);
    match keys.into_iter().find(|key| !allowed.contains(key)) {
        Some(key) => Validation::Rejected { key: Some(key.to_owned()) },
        None => Validation::Accepted,
    }
}

/// Validate parsed parameters.
#[must_use]
pub fn validate_params(table: &RouteTable, path: &str, params: &QueryParams) -> Validation {
    validate(table, path, params.keys())
}

/// Validate a raw query string; malformed input is rejected.
#[must_use]
pub fn validate_raw(table: &RouteTable, path: &str, raw: &str) -> Validation {
    match QueryParams::parse(raw) {
        Ok(params) => validate_params(table, path, &params),
        Err(_) => Validation::Rejected { key: None },
    }
}
