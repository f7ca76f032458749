//! Marker attribute parsing.
//!
//! Parses the `key=value;key=value` syntax that follows `|` in a marker.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::Serialize;

use crate::WidgetError;

/// Reserved attribute holding the cache lifetime in seconds.
pub const CACHE_ATTRIBUTE: &str = "cache";

/// Attributes parsed from a marker, sorted by key.
///
/// Sorting is what makes the cache key of a marker independent of the order
/// its attributes were written in.
///
/// # Example
///
/// ```
/// use inlay_core::AttributeSet;
///
/// let mut attrs = AttributeSet::parse("tpl=small; limit = 5;cache=300");
/// assert_eq!(attrs.take_cache_ttl(), 300);
/// assert_eq!(attrs.get("limit"), Some("5"));
/// assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["limit", "tpl"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeSet {
    attrs: BTreeMap<String, String>,
}

impl AttributeSet {
    /// Parse a raw attribute string.
    ///
    /// Terms are separated by `;` and split on their first `=`. Keys and values
    /// are trimmed. Terms without `=`, with an empty key, or with an empty value
    /// are dropped. A repeated key keeps its last value.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut attrs = BTreeMap::new();

        for term in raw.split(';').filter(|term| !term.is_empty()) {
            let Some((key, value)) = term.split_once('=') else {
                tracing::debug!("dropping attribute term without value: {term:?}");
                continue;
            };

            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            attrs.insert(key.to_owned(), value.to_owned());
        }

        Self { attrs }
    }

    /// Remove the reserved `cache` attribute and return its value in seconds.
    ///
    /// Returns 0 (no caching) when the attribute is absent or is not a
    /// non-negative integer.
    pub fn take_cache_ttl(&mut self) -> u64 {
        self.attrs
            .remove(CACHE_ATTRIBUTE)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0)
    }

    /// Get an attribute value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Get an attribute value or fail with [`WidgetError::MissingAttribute`].
    pub fn require(&self, key: &str) -> Result<&str, WidgetError> {
        self.get(key)
            .ok_or_else(|| WidgetError::MissingAttribute(key.to_owned()))
    }

    /// Parse an attribute value into a typed field.
    ///
    /// Returns `Ok(None)` when the attribute is absent.
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>, WidgetError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|value| {
                value.parse::<T>().map_err(|e| WidgetError::InvalidAttribute {
                    name: key.to_owned(),
                    value: value.to_owned(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Reject any attribute whose key is not in `known`.
    ///
    /// For widgets that want strict attribute checking in `configure`.
    pub fn ensure_known(&self, known: &[&str]) -> Result<(), WidgetError> {
        match self.keys().find(|key| !known.contains(key)) {
            Some(key) => Err(WidgetError::UnknownAttribute(key.to_owned())),
            None => Ok(()),
        }
    }

    /// Attribute keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Key-value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
