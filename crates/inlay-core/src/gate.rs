//! Widget invocation behind the fragment cache.

use std::time::Duration;

use inlay_cache::FragmentCache;

use crate::{AttributeSet, DecodeError, WidgetRegistry};

/// Prefix of every fragment cache key.
const CACHE_KEY_PREFIX: &str = "widget_";

/// Compute the cache key for a widget invocation.
///
/// The key is `widget_<alias>_<attrs as JSON>`. [`AttributeSet`] is sorted,
/// so markers differing only in attribute order share a key.
///
/// # Example
///
/// ```
/// use inlay_core::{AttributeSet, cache_key};
///
/// let a = cache_key("LastPosts", &AttributeSet::parse("tpl=small;limit=5"));
/// let b = cache_key("LastPosts", &AttributeSet::parse("limit=5;tpl=small"));
/// assert_eq!(a, b);
/// assert_eq!(a, r#"widget_LastPosts_{"limit":"5","tpl":"small"}"#);
/// ```
#[must_use]
pub fn cache_key(alias: &str, attrs: &AttributeSet) -> String {
    // Serializing a map of strings can not fail
    let serialized = serde_json::to_string(attrs).unwrap_or_default();
    format!("{CACHE_KEY_PREFIX}{alias}_{serialized}")
}

/// Resolves one marker to its fragment, consulting the cache when asked to.
pub(crate) struct InvocationGate<'a> {
    pub(crate) registry: &'a WidgetRegistry,
    pub(crate) cache: &'a dyn FragmentCache,
    pub(crate) location: &'a str,
}

impl InvocationGate<'_> {
    /// Render the widget for `alias` with the marker's raw attribute string.
    ///
    /// A positive `cache=<seconds>` attribute enables caching for this marker:
    /// a live entry is returned as-is, otherwise the rendered fragment is
    /// stored for that long. Cache failures degrade to a miss.
    pub(crate) fn resolve(&self, alias: &str, raw_attrs: &str) -> Result<String, DecodeError> {
        let mut attrs = AttributeSet::parse(raw_attrs);
        let ttl = attrs.take_cache_ttl();
        let key = cache_key(alias, &attrs);

        if ttl > 0 {
            match self.cache.get(&key) {
                Ok(Some(fragment)) => {
                    tracing::debug!(widget = alias, key = %key, "fragment cache hit");
                    return Ok(fragment);
                }
                Ok(None) => tracing::debug!(widget = alias, key = %key, "fragment cache miss"),
                Err(e) => tracing::warn!("fragment cache read failed for {key}: {e}"),
            }
        }

        let fragment = self.invoke(alias, &attrs)?;

        if ttl > 0
            && let Err(e) = self.cache.set(&key, &fragment, Duration::from_secs(ttl))
        {
            tracing::warn!("fragment cache write failed for {key}: {e}");
        }

        Ok(fragment)
    }

    fn invoke(&self, alias: &str, attrs: &AttributeSet) -> Result<String, DecodeError> {
        let mut widget = self.registry.create(alias, self.location)?;
        let invocation = |source| DecodeError::Invocation {
            widget: alias.to_owned(),
            source,
        };

        widget.configure(attrs).map_err(invocation)?;
        let output = widget.run().map_err(invocation)?;

        tracing::debug!(widget = alias, bytes = output.len(), "widget rendered");
        Ok(output.trim().to_owned())
    }
}
