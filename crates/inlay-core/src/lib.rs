//! Inline widget markers for rendered text.
//!
//! Content such as an article body can embed markers that name a widget and
//! pass it attributes:
//!
//! ```text
//! <p>[*LastPosts*]</p>
//! <p>[*LastPosts|limit=5;tpl=small*]</p>
//! <p>[*blog.widgets.LastPosts|limit=5;cache=300*]</p>
//! ```
//!
//! [`WidgetDecoder::decode_widgets`] replaces every marker whose widget is in
//! the configured allow-list with that widget's rendered output.
//!
//! # Pipeline
//!
//! 1. **Tokenize**: delimiters are rewritten to an internal wrapper keyed by a
//!    token drawn fresh for each call, so literal delimiter text can not be
//!    mistaken for a marker later on.
//! 2. **Strip paragraphs**: `<p>` directly before and `</p>` directly after a
//!    marker are removed, undoing auto-paragraph wrapping of marker-only lines.
//! 3. **Resolve**: for each allow-list entry, markers with its name are
//!    replaced one distinct marker at a time. Attributes are parsed into a
//!    sorted [`AttributeSet`]; the reserved `cache=<seconds>` attribute routes
//!    the invocation through the [`FragmentCache`](inlay_cache::FragmentCache).
//!
//! Widgets implement [`Widget`] and are registered by type path in a
//! [`WidgetRegistry`].

mod attrs;
mod decoder;
mod error;
mod gate;
mod registry;
mod resolver;
mod session;
mod widget;

pub use attrs::{AttributeSet, CACHE_ATTRIBUTE};
pub use decoder::{DEFAULT_END_DELIMITER, DEFAULT_START_DELIMITER, DecoderConfig, WidgetDecoder};
pub use error::{DecodeError, WidgetError};
pub use gate::cache_key;
pub use registry::{WIDGET_SUFFIX, WidgetRegistry, type_path};
pub use widget::Widget;
