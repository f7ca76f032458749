//! Widget handler registry.
//!
//! Maps handler type paths to factories. A type path is a dotted name ending
//! in the handler type, e.g. `blog.widgets.LastPostsWidget`, or just the bare
//! type name `LastPostsWidget` for handlers in the global namespace.

use std::collections::HashMap;
use std::fmt;

use crate::{DecodeError, Widget};

/// Suffix appended to a widget alias to form its handler type name.
pub const WIDGET_SUFFIX: &str = "Widget";

type WidgetFactory = Box<dyn Fn() -> Box<dyn Widget> + Send + Sync>;

/// Registry of constructible widget handlers.
///
/// Populated once at startup, then shared read-only by decoders.
///
/// # Example
///
/// ```
/// use inlay_core::{Widget, WidgetError, WidgetRegistry, type_path};
///
/// struct Share;
///
/// impl Widget for Share {
///     fn run(&mut self) -> Result<String, WidgetError> {
///         Ok("<div class=\"share\"></div>".to_owned())
///     }
/// }
///
/// let registry = WidgetRegistry::new().with_widget("ShareWidget", || Share);
/// assert!(registry.contains("ShareWidget"));
/// assert_eq!(type_path("Share", ""), "ShareWidget");
/// ```
#[derive(Default)]
pub struct WidgetRegistry {
    factories: HashMap<String, WidgetFactory>,
}

impl WidgetRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler factory under a type path.
    ///
    /// Replaces any factory previously registered under the same path.
    pub fn register<W, F>(&mut self, type_path: impl Into<String>, factory: F)
    where
        W: Widget + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        self.factories.insert(
            type_path.into(),
            Box::new(move || Box::new(factory()) as Box<dyn Widget>),
        );
    }

    /// Register a handler factory, builder style.
    #[must_use]
    pub fn with_widget<W, F>(mut self, type_path: impl Into<String>, factory: F) -> Self
    where
        W: Widget + 'static,
        F: Fn() -> W + Send + Sync + 'static,
    {
        self.register(type_path, factory);
        self
    }

    /// Whether a factory is registered under exactly this type path.
    #[must_use]
    pub fn contains(&self, type_path: &str) -> bool {
        self.factories.contains_key(type_path)
    }

    /// Registered type paths, sorted.
    #[must_use]
    pub fn type_paths(&self) -> Vec<&str> {
        let mut paths: Vec<_> = self.factories.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    /// Whether [`create`](Self::create) would find a handler for `alias`.
    #[must_use]
    pub fn resolves(&self, alias: &str, location: &str) -> bool {
        self.factory(&type_path(alias, location)).is_some()
    }

    /// Instantiate the handler for an allow-list alias.
    ///
    /// The full type path is looked up first, then its trailing type name
    /// (a handler registered in the global namespace).
    pub fn create(&self, alias: &str, location: &str) -> Result<Box<dyn Widget>, DecodeError> {
        let type_path = type_path(alias, location);
        match self.factory(&type_path) {
            Some(factory) => Ok(factory()),
            None => Err(DecodeError::Resolution {
                widget: alias.to_owned(),
                type_path,
            }),
        }
    }

    fn factory(&self, type_path: &str) -> Option<&WidgetFactory> {
        self.factories
            .get(type_path)
            .or_else(|| self.factories.get(type_name(type_path)))
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("type_paths", &self.type_paths())
            .finish()
    }
}

/// Compute the handler type path for an allow-list alias.
///
/// The suffix [`WIDGET_SUFFIX`] is appended to the alias. Dotted aliases are
/// already fully qualified; bare aliases are placed under `location` when one
/// is configured.
#[must_use]
pub fn type_path(alias: &str, location: &str) -> String {
    let qualified = format!("{alias}{WIDGET_SUFFIX}");
    if alias.contains('.') || location.is_empty() {
        qualified
    } else {
        format!("{location}.{qualified}")
    }
}

/// Trailing segment of a dotted path.
pub(crate) fn type_name(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
