//! Query string parameters.

use indexmap::IndexMap;
use serde_json::{Map, Value as Json};

use crate::{ExtractionError, ExtractionSource};

/// Decoded query parameters, keeping every value of repeated keys.
///
/// # Example
///
/// ```rust
/// use hermes_extract::QueryParams;
///
/// let query = QueryParams::parse("limit=10&tag=a&tag=b").unwrap();
/// assert_eq!(query.get("limit"), Some("10"));
/// assert_eq!(query.get_all("tag"), ["a", "b"]);
///
/// let data = query.to_form_data();
/// assert_eq!(data["limit"], "10");
/// assert_eq!(data["tag"], serde_json::json!(["a", "b"]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: IndexMap<String, Vec<String>>,
}

impl QueryParams {
    /// No parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Result<Self, ExtractionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)
            .map_err(|e| ExtractionError::malformed(ExtractionSource::Query, e.to_string()))?;
        Ok(pairs.into_iter().collect())
    }

    /// Appends a value.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Every value of `key`.
    #[must_use]
    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map_or(&[][..], Vec::as_slice)
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encodes back into a query string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<(&str, &str)> = self
            .values
            .iter()
            .flat_map(|(k, vs)| vs.iter().map(move |v| (k.as_str(), v.as_str())))
            .collect();
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }

    /// Form input view: single values become strings, repeated keys lists.
    #[must_use]
    pub fn to_form_data(&self) -> Map<String, Json> {
        self.values
            .iter()
            .map(|(key, values)| {
                let value = match values.as_slice() {
                    [single] => Json::String(single.clone()),
                    many => Json::Array(many.iter().cloned().map(Json::String).collect()),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}
