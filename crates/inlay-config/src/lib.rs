//! Configuration management for inlay.
//!
//! Parses `inlay.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Example
//!
//! ```toml
//! [widgets]
//! start_delimiter = "[*"
//! end_delimiter = "*]"
//! location = "app.widgets"
//! allow = ["LastPosts", "blog.widgets.Share"]
//!
//! [cache]
//! enabled = true
//! dir = "~/.cache/inlay"
//! ```
//!
//! `cache.dir` supports `~` and `$VAR` / `${VAR}` expansion and is resolved
//! relative to the directory containing the config file.

use std::path::{Path, PathBuf};

use inlay_core::{DEFAULT_END_DELIMITER, DEFAULT_START_DELIMITER, DecoderConfig};
use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override cache enabled flag.
    pub cache_enabled: Option<bool>,
    /// Override cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Override widget base location.
    pub location: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "inlay.toml";

/// Default cache directory, relative to the config file.
const DEFAULT_CACHE_DIR: &str = ".inlay/cache";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Widget marker configuration.
    pub widgets: WidgetsConfig,
    /// Cache configuration (paths are relative strings from TOML).
    #[serde(rename = "cache")]
    cache_raw: CacheConfigRaw,

    /// Resolved cache configuration (set after loading).
    #[serde(skip)]
    pub cache: CacheConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Widget marker configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WidgetsConfig {
    /// Sequence that opens a marker.
    pub start_delimiter: String,
    /// Sequence that closes a marker.
    pub end_delimiter: String,
    /// Base location for bare widget names.
    pub location: String,
    /// Allow-list of widget names or dotted aliases.
    pub allow: Vec<String>,
}

impl Default for WidgetsConfig {
    fn default() -> Self {
        Self {
            start_delimiter: DEFAULT_START_DELIMITER.to_owned(),
            end_delimiter: DEFAULT_END_DELIMITER.to_owned(),
            location: String::new(),
            allow: Vec::new(),
        }
    }
}

impl WidgetsConfig {
    /// Decoder settings for this section, with allow-list entries trimmed.
    #[must_use]
    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig::new()
            .with_start_delimiter(self.start_delimiter.as_str())
            .with_end_delimiter(self.end_delimiter.as_str())
            .with_location(self.location.as_str())
            .with_widgets(&self.allow)
    }
}

/// Raw cache configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CacheConfigRaw {
    enabled: Option<bool>,
    dir: Option<String>,
}

/// Resolved cache configuration with absolute paths.
#[derive(Debug, Default)]
pub struct CacheConfig {
    /// Whether widget output caching is enabled.
    pub enabled: bool,
    /// Directory for cached fragments.
    pub dir: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`cache.dir`").
        field: String,
        /// Error message (e.g., "`INLAY_CACHE` not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `inlay.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(cache_enabled) = settings.cache_enabled {
            self.cache.enabled = cache_enabled;
        }
        if let Some(cache_dir) = &settings.cache_dir {
            self.cache.dir.clone_from(cache_dir);
        }
        if let Some(location) = &settings.location {
            self.widgets.location.clone_from(location);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            widgets: WidgetsConfig::default(),
            cache_raw: CacheConfigRaw::default(),
            cache: CacheConfig {
                enabled: true,
                dir: base.join(DEFAULT_CACHE_DIR),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_widgets()
    }

    /// Validate marker delimiters and the allow-list with the decoder's rules.
    fn validate_widgets(&self) -> Result<(), ConfigError> {
        self.widgets
            .decoder_config()
            .validate()
            .map_err(|e| ConfigError::Validation(format!("[widgets] {e}")))
    }

    /// Resolve the cache directory, expanding `~` and environment variables.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let dir = match self.cache_raw.dir.as_deref() {
            Some(raw) => {
                let expanded = shellexpand::full(raw).map_err(|e| ConfigError::EnvVar {
                    field: "cache.dir".to_owned(),
                    message: e.to_string(),
                })?;
                config_dir.join(expanded.as_ref())
            }
            None => config_dir.join(DEFAULT_CACHE_DIR),
        };

        self.cache = CacheConfig {
            enabled: self.cache_raw.enabled.unwrap_or(true),
            dir,
        };

        Ok(())
    }
}
