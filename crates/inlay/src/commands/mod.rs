//! CLI command implementations.

mod decode;
mod widgets;

pub(crate) use decode::DecodeArgs;
pub(crate) use widgets::WidgetsArgs;
