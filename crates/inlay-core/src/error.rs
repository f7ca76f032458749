//! Error types for widget decoding.

/// Error raised by a widget while being configured or run.
#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The marker passed an attribute the widget does not understand.
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),
    /// An attribute value could not be interpreted.
    #[error("invalid value '{value}' for attribute '{name}': {reason}")]
    InvalidAttribute {
        /// Attribute key.
        name: String,
        /// Raw attribute value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
    /// A required attribute was not provided.
    #[error("missing required attribute '{0}'")]
    MissingAttribute(String),
    /// Rendering failed.
    #[error("{0}")]
    Render(String),
    /// I/O error while rendering.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error returned by [`WidgetDecoder`](crate::WidgetDecoder).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Invalid decoder configuration.
    #[error("invalid decoder configuration: {0}")]
    Config(String),
    /// An allow-listed widget has no registered handler.
    #[error("cannot resolve widget '{widget}': no handler registered for '{type_path}'")]
    Resolution {
        /// Allow-list entry as configured.
        widget: String,
        /// Handler type path computed from the entry.
        type_path: String,
    },
    /// The widget handler failed.
    #[error("widget '{widget}' failed: {source}")]
    Invocation {
        /// Allow-list entry as configured.
        widget: String,
        /// Error raised by the handler.
        #[source]
        source: WidgetError,
    },
    /// An internal marker pattern failed to compile.
    #[error("marker pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
