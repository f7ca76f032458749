//! Widget handler trait.

use crate::{AttributeSet, WidgetError};

/// A named unit of logic that renders a text fragment for a marker.
///
/// A fresh instance is created for every marker that is not served from
/// cache: the decoder calls [`configure`](Self::configure) once with the
/// marker's attributes (the reserved `cache` key already removed), then
/// [`run`](Self::run) once. The returned fragment is trimmed before it is
/// spliced into the text.
///
/// # Example
///
/// ```
/// use inlay_core::{AttributeSet, Widget, WidgetError};
///
/// #[derive(Default)]
/// struct LastPosts {
///     limit: u32,
/// }
///
/// impl Widget for LastPosts {
///     fn configure(&mut self, attrs: &AttributeSet) -> Result<(), WidgetError> {
///         attrs.ensure_known(&["limit"])?;
///         self.limit = attrs.get_parsed("limit")?.unwrap_or(3);
///         Ok(())
///     }
///
///     fn run(&mut self) -> Result<String, WidgetError> {
///         Ok(format!("<ul data-limit=\"{}\"></ul>", self.limit))
///     }
/// }
/// ```
pub trait Widget: Send {
    /// Apply marker attributes to this instance.
    ///
    /// The default implementation ignores all attributes. Widgets that want
    /// typos in markers to surface as errors should call
    /// [`AttributeSet::ensure_known`].
    fn configure(&mut self, attrs: &AttributeSet) -> Result<(), WidgetError> {
        let _ = attrs;
        Ok(())
    }

    /// Render the fragment.
    fn run(&mut self) -> Result<String, WidgetError>;
}
