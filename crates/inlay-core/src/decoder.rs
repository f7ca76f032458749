//! Decoder configuration and the `decode_widgets` entry point.

use std::sync::Arc;

use inlay_cache::{FragmentCache, NullCache};

use crate::gate::InvocationGate;
use crate::registry::type_name;
use crate::resolver::resolve_markers;
use crate::session::DecodeSession;
use crate::{DecodeError, WidgetRegistry};

/// Default marker start delimiter.
pub const DEFAULT_START_DELIMITER: &str = "[*";
/// Default marker end delimiter.
pub const DEFAULT_END_DELIMITER: &str = "*]";

/// Configuration for a [`WidgetDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Sequence that opens a marker.
    ///
    /// Default: `[*`
    pub start_delimiter: String,
    /// Sequence that closes a marker.
    ///
    /// Default: `*]`
    pub end_delimiter: String,
    /// Base path for bare widget names, e.g. `app.widgets`.
    ///
    /// Default: empty (bare names resolve in the global namespace)
    pub location: String,
    /// Allow-list of widget names or dotted aliases, in resolution order.
    pub widgets: Vec<String>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DecoderConfig {
    /// Create a configuration with default delimiters and an empty allow-list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start_delimiter: DEFAULT_START_DELIMITER.to_owned(),
            end_delimiter: DEFAULT_END_DELIMITER.to_owned(),
            location: String::new(),
            widgets: Vec::new(),
        }
    }

    /// Set the marker start delimiter.
    #[must_use]
    pub fn with_start_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.start_delimiter = delimiter.into();
        self
    }

    /// Set the marker end delimiter.
    #[must_use]
    pub fn with_end_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.end_delimiter = delimiter.into();
        self
    }

    /// Set the base location for bare widget names.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Replace the allow-list. Entries are trimmed.
    #[must_use]
    pub fn with_widgets<I, S>(mut self, widgets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.widgets = widgets
            .into_iter()
            .map(|widget| trimmed(widget.into()))
            .collect();
        self
    }

    /// Append one entry to the allow-list. The entry is trimmed.
    #[must_use]
    pub fn with_widget(mut self, widget: impl Into<String>) -> Self {
        self.widgets.push(trimmed(widget.into()));
        self
    }

    /// Trim allow-list entries set directly through the public field.
    fn normalize(&mut self) {
        for widget in &mut self.widgets {
            *widget = trimmed(std::mem::take(widget));
        }
    }

    /// Validate delimiters and allow-list entries.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Config`] if a delimiter is empty, both
    /// delimiters are equal, or an allow-list entry has an empty name.
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.start_delimiter.is_empty() {
            return Err(DecodeError::Config(
                "start delimiter cannot be empty".to_owned(),
            ));
        }
        if self.end_delimiter.is_empty() {
            return Err(DecodeError::Config(
                "end delimiter cannot be empty".to_owned(),
            ));
        }
        if self.start_delimiter == self.end_delimiter {
            return Err(DecodeError::Config(format!(
                "start and end delimiters must differ (both are {:?})",
                self.start_delimiter
            )));
        }
        for (idx, widget) in self.widgets.iter().enumerate() {
            if type_name(widget.trim()).is_empty() {
                return Err(DecodeError::Config(format!(
                    "widget entry {idx} ({widget:?}) has an empty name"
                )));
            }
        }
        Ok(())
    }
}

fn trimmed(entry: String) -> String {
    if entry.trim().len() == entry.len() {
        entry
    } else {
        entry.trim().to_owned()
    }
}

/// Replaces widget markers in text with rendered widget output.
///
/// A decoder is built once and may be shared: each
/// [`decode_widgets`](Self::decode_widgets) call works in its own session
/// with a freshly drawn token, so concurrent calls never share state besides
/// the registry and the cache.
///
/// # Example
///
/// ```
/// use inlay_core::{DecoderConfig, Widget, WidgetDecoder, WidgetError, WidgetRegistry};
///
/// struct LastPosts;
///
/// impl Widget for LastPosts {
///     fn run(&mut self) -> Result<String, WidgetError> {
///         Ok("<div>posts</div>".to_owned())
///     }
/// }
///
/// let registry = WidgetRegistry::new().with_widget("LastPostsWidget", || LastPosts);
/// let config = DecoderConfig::new().with_widget("LastPosts");
/// let decoder = WidgetDecoder::new(config, registry).unwrap();
///
/// let html = decoder
///     .decode_widgets("<h2>News</h2>\n<p>[*LastPosts|limit=5;tpl=small*]</p>")
///     .unwrap();
/// assert_eq!(html, "<h2>News</h2>\n<div>posts</div>");
/// ```
pub struct WidgetDecoder {
    config: DecoderConfig,
    registry: WidgetRegistry,
    cache: Arc<dyn FragmentCache>,
}

impl WidgetDecoder {
    /// Create a decoder without a fragment cache.
    ///
    /// Allow-list entries are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Config`] if the configuration is invalid.
    pub fn new(mut config: DecoderConfig, registry: WidgetRegistry) -> Result<Self, DecodeError> {
        config.normalize();
        config.validate()?;
        Ok(Self {
            config,
            registry,
            cache: Arc::new(NullCache),
        })
    }

    /// Use `cache` for markers carrying a `cache=<seconds>` attribute.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn FragmentCache>) -> Self {
        self.cache = cache;
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// The handler registry.
    #[must_use]
    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Replace every allow-listed widget marker in `text` with its output.
    ///
    /// Markers for widgets outside the allow-list are left as written. Text
    /// without markers is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Resolution`] when an allow-listed widget has no
    /// registered handler, and [`DecodeError::Invocation`] when a handler
    /// fails. Nothing is retried.
    pub fn decode_widgets(&self, text: &str) -> Result<String, DecodeError> {
        let session = DecodeSession::new(
            &self.config.start_delimiter,
            &self.config.end_delimiter,
            text,
        );

        let tokenized = session.tokenize(text);
        if !session.has_markers(&tokenized) {
            return Ok(text.to_owned());
        }

        let stripped = session.strip_paragraphs(&tokenized);
        let gate = InvocationGate {
            registry: &self.registry,
            cache: self.cache.as_ref(),
            location: &self.config.location,
        };
        let resolved = resolve_markers(&session, &gate, &self.config.widgets, stripped)?;

        Ok(session.restore(&resolved))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use inlay_cache::MemoryCache;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{AttributeSet, Widget, WidgetError};

    struct Posts {
        calls: Arc<AtomicUsize>,
        limit: u32,
    }

    impl Widget for Posts {
        fn configure(&mut self, attrs: &AttributeSet) -> Result<(), WidgetError> {
            self.limit = attrs.get_parsed("limit")?.unwrap_or(3);
            Ok(())
        }

        fn run(&mut self) -> Result<String, WidgetError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("\n<ul data-limit=\"{}\" data-run=\"{n}\"></ul>\n", self.limit))
        }
    }

    struct Fixed(&'static str);

    impl Widget for Fixed {
        fn run(&mut self) -> Result<String, WidgetError> {
            Ok(self.0.to_owned())
        }
    }

    fn posts_decoder(calls: &Arc<AtomicUsize>) -> WidgetDecoder {
        let calls = Arc::clone(calls);
        let registry = WidgetRegistry::new().with_widget("LastPostsWidget", move || Posts {
            calls: Arc::clone(&calls),
            limit: 0,
        });
        WidgetDecoder::new(DecoderConfig::new().with_widget("LastPosts"), registry)
            .unwrap()
            .with_cache(Arc::new(MemoryCache::new()))
    }

    #[test]
    fn test_config_defaults() {
        let config = DecoderConfig::default();
        assert_eq!(config.start_delimiter, "[*");
        assert_eq!(config.end_delimiter, "*]");
        assert_eq!(config.location, "");
        assert!(config.widgets.is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = DecoderConfig::new()
            .with_start_delimiter("{{")
            .with_end_delimiter("}}")
            .with_location("app.widgets")
            .with_widgets(["Share", "blog.LastPosts"])
            .with_widget("Comments");

        assert_eq!(config.start_delimiter, "{{");
        assert_eq!(config.end_delimiter, "}}");
        assert_eq!(config.location, "app.widgets");
        assert_eq!(config.widgets, vec!["Share", "blog.LastPosts", "Comments"]);
    }

    #[test]
    fn test_config_rejects_empty_delimiters() {
        let start = DecoderConfig::new().with_start_delimiter("");
        assert!(matches!(start.validate(), Err(DecodeError::Config(_))));

        let end = DecoderConfig::new().with_end_delimiter("");
        assert!(matches!(end.validate(), Err(DecodeError::Config(_))));
    }

    #[test]
    fn test_config_rejects_equal_delimiters() {
        let config = DecoderConfig::new()
            .with_start_delimiter("%%")
            .with_end_delimiter("%%");
        assert!(matches!(config.validate(), Err(DecodeError::Config(_))));
    }

    #[test]
    fn test_config_rejects_empty_widget_names() {
        for bad in ["", "  ", "blog.widgets."] {
            let config = DecoderConfig::new().with_widget(bad);
            assert!(
                matches!(config.validate(), Err(DecodeError::Config(_))),
                "entry {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_config_builder_trims_entries() {
        let config = DecoderConfig::new()
            .with_widgets([" Share", "blog.LastPosts "])
            .with_widget("\tComments\n");
        assert_eq!(config.widgets, vec!["Share", "blog.LastPosts", "Comments"]);
    }

    #[test]
    fn test_padded_allow_entry_resolves() {
        let registry = WidgetRegistry::new().with_widget("FooWidget", || Fixed("X"));
        let built = WidgetDecoder::new(DecoderConfig::new().with_widget(" Foo"), registry).unwrap();
        assert_eq!(built.decode_widgets("[*Foo*]").unwrap(), "X");

        let registry = WidgetRegistry::new().with_widget("FooWidget", || Fixed("X"));
        let config = DecoderConfig {
            widgets: vec![" Foo ".to_owned()],
            ..DecoderConfig::new()
        };
        let direct = WidgetDecoder::new(config, registry).unwrap();
        assert_eq!(direct.config().widgets, vec!["Foo"]);
        assert_eq!(direct.decode_widgets("[*Foo*]").unwrap(), "X");
    }

    #[test]
    fn test_literal_braces_survive_unterminated_marker() {
        let registry = WidgetRegistry::new().with_widget("FooWidget", || Fixed("X"));
        let decoder =
            WidgetDecoder::new(DecoderConfig::new().with_widget("Foo"), registry).unwrap();

        assert_eq!(
            decoder.decode_widgets("Type [* to open a {block} here").unwrap(),
            "Type [* to open a {block} here"
        );
        assert_eq!(
            decoder
                .decode_widgets("<p>[*Foo*]</p><p>Use [* then {x}</p>")
                .unwrap(),
            "X<p>Use [* then {x}</p>"
        );
    }

    #[test]
    fn test_stray_end_delimiter_kept_next_to_marker() {
        let registry = WidgetRegistry::new().with_widget("FooWidget", || Fixed("X"));
        let decoder =
            WidgetDecoder::new(DecoderConfig::new().with_widget("Foo"), registry).unwrap();

        let out = decoder.decode_widgets("[*Foo*] closes *] twice").unwrap();
        assert_eq!(out, "X closes *] twice");
    }

    #[test]
    fn test_new_validates() {
        let config = DecoderConfig::new().with_start_delimiter("");
        assert!(WidgetDecoder::new(config, WidgetRegistry::new()).is_err());
    }

    #[test]
    fn test_text_without_markers_is_identity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        for text in [
            "",
            "plain text",
            "<p>Lorem ipsum</p>\n<p>Dolor {sit} amet</p>",
            "stray end *] delimiter",
        ] {
            assert_eq!(decoder.decode_widgets(text).unwrap(), text);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_paragraph_wrapped_marker_scenario() {
        let registry =
            WidgetRegistry::new().with_widget("LastPostsWidget", || Fixed("<div>posts</div>"));
        let decoder =
            WidgetDecoder::new(DecoderConfig::new().with_widget("LastPosts"), registry).unwrap();

        let out = decoder
            .decode_widgets("<p>[*LastPosts|limit=5;tpl=small*]</p>")
            .unwrap();
        assert_eq!(out, "<div>posts</div>");
    }

    #[test]
    fn test_inline_marker_keeps_paragraph() {
        let registry = WidgetRegistry::new().with_widget("NameWidget", || Fixed("inlay"));
        let decoder =
            WidgetDecoder::new(DecoderConfig::new().with_widget("Name"), registry).unwrap();

        let out = decoder.decode_widgets("<p>Built with [*Name*].</p>").unwrap();
        assert_eq!(out, "<p>Built with inlay.</p>");
    }

    #[test]
    fn test_cached_marker_invokes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        let first = decoder
            .decode_widgets("[*LastPosts|limit=5;cache=300*]")
            .unwrap();
        let second = decoder
            .decode_widgets("[*LastPosts|limit=5;cache=300*]")
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, r#"<ul data-limit="5" data-run="1"></ul>"#);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_uncached_marker_invokes_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        decoder.decode_widgets("[*LastPosts|limit=5*]").unwrap();
        decoder.decode_widgets("[*LastPosts|limit=5*]").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_distinct_attributes_in_one_text() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        let out = decoder
            .decode_widgets("<p>[*LastPosts|limit=3*]</p>\n<p>[*LastPosts|limit=5*]</p>")
            .unwrap();

        assert_eq!(
            out,
            "<ul data-limit=\"3\" data-run=\"1\"></ul>\n<ul data-limit=\"5\" data-run=\"2\"></ul>"
        );
    }

    #[test]
    fn test_unknown_widget_left_as_written() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        let out = decoder
            .decode_widgets("[*Comments|page=2*] and [*LastPosts*]")
            .unwrap();
        assert_eq!(
            out,
            "[*Comments|page=2*] and <ul data-limit=\"3\" data-run=\"1\"></ul>"
        );
    }

    #[test]
    fn test_unresolvable_widget_fails() {
        let decoder = WidgetDecoder::new(
            DecoderConfig::new()
                .with_location("app.widgets")
                .with_widget("Share"),
            WidgetRegistry::new(),
        )
        .unwrap();

        match decoder.decode_widgets("[*Share*]") {
            Err(DecodeError::Resolution { widget, type_path }) => {
                assert_eq!(widget, "Share");
                assert_eq!(type_path, "app.widgets.ShareWidget");
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_attribute_is_invocation_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let decoder = posts_decoder(&calls);

        let err = decoder
            .decode_widgets("[*LastPosts|limit=many*]")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Invocation { .. }));
    }

    #[test]
    fn test_custom_delimiters() {
        let registry = WidgetRegistry::new().with_widget("ShareWidget", || Fixed("<share/>"));
        let config = DecoderConfig::new()
            .with_start_delimiter("{{")
            .with_end_delimiter("}}")
            .with_widget("Share");
        let decoder = WidgetDecoder::new(config, registry).unwrap();

        let out = decoder
            .decode_widgets("<p>{{Share}}</p> [*Share*] {{Other|x=1}}")
            .unwrap();
        assert_eq!(out, "<share/> [*Share*] {{Other|x=1}}");
    }

    #[test]
    fn test_allow_list_order_and_location() {
        let registry = WidgetRegistry::new()
            .with_widget("app.widgets.ShareWidget", || Fixed("share"))
            .with_widget("blog.CommentsWidget", || Fixed("comments"));
        let config = DecoderConfig::new()
            .with_location("app.widgets")
            .with_widgets(["Share", "blog.Comments"]);
        let decoder = WidgetDecoder::new(config, registry).unwrap();

        let out = decoder.decode_widgets("[*Comments*] / [*share*]").unwrap();
        assert_eq!(out, "comments / share");
    }

    #[test]
    fn test_decoder_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WidgetDecoder>();
    }
}
