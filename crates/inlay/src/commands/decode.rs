//! Decode command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use inlay_cache::{FileCache, FragmentCache, NullCache};
use inlay_config::{CliSettings, Config};
use inlay_core::WidgetDecoder;

use crate::error::CliError;
use crate::widgets::builtin_registry;

/// Arguments for the decode command.
#[derive(Args)]
pub(crate) struct DecodeArgs {
    /// Input file. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover inlay.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Disable the fragment cache.
    #[arg(long)]
    no_cache: bool,

    /// Fragment cache directory.
    #[arg(long, env = "INLAY_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Base location prepended to bare widget aliases.
    #[arg(long)]
    location: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl DecodeArgs {
    /// Execute the decode command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, reading the input,
    /// decoding, or writing the output fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            cache_enabled: self.no_cache.then_some(false),
            cache_dir: self.cache_dir.clone(),
            location: self.location.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let input_path = self.input.as_deref().filter(|p| *p != Path::new("-"));
        let text = read_input(input_path)?;
        let base_dir = base_dir(input_path)?;

        let decoder = WidgetDecoder::new(
            config.widgets.decoder_config(),
            builtin_registry(&base_dir),
        )?
            .with_cache(fragment_cache(&config));

        let decoded = decoder.decode_widgets(&text)?;
        tracing::debug!(
            input_bytes = text.len(),
            output_bytes = decoded.len(),
            "Decoded document"
        );

        write_output(self.output.as_deref(), &decoded)
    }
}

/// File-backed cache when enabled, otherwise a cache that never stores.
fn fragment_cache(config: &Config) -> Arc<dyn FragmentCache> {
    if config.cache.enabled {
        tracing::debug!(dir = %config.cache.dir.display(), "Using fragment cache");
        Arc::new(FileCache::new(
            config.cache.dir.clone(),
            env!("CARGO_PKG_VERSION"),
        ))
    } else {
        Arc::new(NullCache)
    }
}

fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Directory relative include paths resolve against.
fn base_dir(input: Option<&Path>) -> Result<PathBuf, CliError> {
    match input.and_then(Path::parent) {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(parent.to_path_buf()),
        _ => Ok(std::env::current_dir()?),
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, text)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_base_dir_uses_input_parent() {
        let result = base_dir(Some(Path::new("docs/page.html"))).unwrap();

        assert_eq!(result, PathBuf::from("docs"));
    }

    #[test]
    fn test_base_dir_falls_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();

        assert_eq!(base_dir(Some(Path::new("page.html"))).unwrap(), cwd);
        assert_eq!(base_dir(None).unwrap(), cwd);
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out.html");

        write_output(Some(&out), "<div>ok</div>").unwrap();

        assert_eq!(std::fs::read_to_string(out).unwrap(), "<div>ok</div>");
    }

    #[test]
    fn test_read_input_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("in.html");
        std::fs::write(&input, "<p>[*Include|path=x*]</p>").unwrap();

        assert_eq!(read_input(Some(&input)).unwrap(), "<p>[*Include|path=x*]</p>");
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Some(Path::new("/nonexistent/in.html"))).unwrap_err();

        assert!(matches!(err, CliError::Io(_)));
    }
}
