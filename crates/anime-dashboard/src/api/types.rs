//! Jikan API v4 request and response types.
//!
//! Responses are kept as `serde_json::Value` until shaping: the API embeds its
//! error semantics in the body, and individual records may be missing any
//! field except the title.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

use crate::error::{DashboardError, Result};

/// Primary query key; the only key kept when parameters are narrowed
pub const QUERY_KEY: &str = "q";

/// Ordered query string parameters (string keys, scalar values)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a parameter, replacing any previous value for the key
    pub fn insert(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Parameters reduced to the query key alone
    ///
    /// Returns None when there is no query key or nothing else to drop.
    pub fn narrowed(&self) -> Option<QueryParams> {
        let query = self.get(QUERY_KEY)?;
        if self.pairs.len() <= 1 {
            return None;
        }
        Some(QueryParams::new().with(QUERY_KEY, query))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (key, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        Ok(())
    }
}

/// Helpers for the `{data: [...]}` / `{error, messages: {error}}` envelope
pub struct ApiEnvelope;

impl ApiEnvelope {
    /// Error message when the body is an API-level error, otherwise None
    ///
    /// A body is an error when it carries an `error` key and its `data` key is
    /// absent, null, empty, or a falsy scalar (`false`, `0`, `""`).
    pub fn error_message(body: &Value) -> Option<String> {
        let error = body.get("error")?;

        let has_data = match body.get("data") {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64() != Some(0.0),
            Some(Value::String(s)) => !s.is_empty(),
        };
        if has_data {
            return None;
        }

        let message = body
            .pointer("/messages/error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| match error {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });
        Some(message)
    }

    /// Records from the `data` array
    ///
    /// Fails with [`DashboardError::Api`] for error bodies; a missing or empty
    /// `data` array yields an empty list.
    pub fn into_records(body: Value) -> Result<Vec<Value>> {
        if let Some(message) = Self::error_message(&body) {
            return Err(DashboardError::Api { message });
        }

        match body {
            Value::Object(mut fields) => match fields.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                _ => Ok(Vec::new()),
            },
            _ => Ok(Vec::new()),
        }
    }
}

/// Deserialize a field, mapping a value of the wrong type to None
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Anime object as returned by `/anime` and `/top/anime`
///
/// Every field is optional. Absent, null and wrongly typed values all
/// deserialize to None, so one odd field never discards the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAnimeRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub mal_id: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_english: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title_japanese: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub images: Option<RawImages>,
    #[serde(default, deserialize_with = "lenient")]
    pub synopsis: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub score: Option<f64>,
    #[serde(default, deserialize_with = "lenient", rename = "type")]
    pub anime_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub episodes: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub members: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub rank: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "lenient")]
    pub genres: Option<Vec<RawEntity>>,
    #[serde(default, deserialize_with = "lenient")]
    pub studios: Option<Vec<RawEntity>>,
    #[serde(default, deserialize_with = "lenient")]
    pub aired: Option<RawAired>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImages {
    #[serde(default, deserialize_with = "lenient")]
    pub jpg: Option<RawImageSet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImageSet {
    #[serde(default, deserialize_with = "lenient")]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub small_image_url: Option<String>,
}

/// Genre/studio reference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntity {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAired {
    #[serde(default, deserialize_with = "lenient")]
    pub string: Option<String>,
}
