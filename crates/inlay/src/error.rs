//! CLI error types.

use inlay_config::ConfigError;
use inlay_core::DecodeError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
