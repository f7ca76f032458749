//! Widgets command implementation.

use std::path::PathBuf;

use clap::Args;
use inlay_config::Config;
use inlay_core::{DecoderConfig, WidgetRegistry, type_path};

use crate::error::CliError;
use crate::output::Output;
use crate::widgets::builtin_registry;

/// Arguments for the widgets command.
#[derive(Args)]
pub(crate) struct WidgetsArgs {
    /// Path to configuration file (default: auto-discover inlay.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// How one allow-list entry resolves.
#[derive(Debug, PartialEq, Eq)]
struct WidgetRow {
    alias: String,
    type_path: String,
    resolved: bool,
}

impl WidgetsArgs {
    /// Execute the widgets command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading fails.
    pub(crate) fn execute(self, output: &Output) -> Result<(), CliError> {
        let config = Config::load(self.config.as_deref(), None)?;
        let decoder_config = config.widgets.decoder_config();
        let registry = builtin_registry(&std::env::current_dir()?);

        if let Some(path) = &config.config_path {
            output.line(&format!("Config: {}", path.display()));
        }
        output.line(&format!(
            "Delimiters: {} ... {}",
            decoder_config.start_delimiter, decoder_config.end_delimiter
        ));

        if decoder_config.widgets.is_empty() {
            output.warning("No widgets allowed. Add names to [widgets] allow in inlay.toml.");
            return Ok(());
        }

        output.heading("Allowed widgets:");
        for row in widget_rows(&decoder_config, &registry) {
            output.widget(&row.alias, &row.type_path, row.resolved);
        }
        Ok(())
    }
}

/// Resolve every allow-list entry the same way the decoder will.
fn widget_rows(config: &DecoderConfig, registry: &WidgetRegistry) -> Vec<WidgetRow> {
    config
        .widgets
        .iter()
        .map(|alias| WidgetRow {
            alias: alias.clone(),
            type_path: type_path(alias, &config.location),
            resolved: registry.resolves(alias, &config.location),
        })
        .collect()
}
