//! Built-in widgets shipped with the CLI.

use std::path::{Path, PathBuf};

use inlay_core::{AttributeSet, Widget, WidgetError, WidgetRegistry};

/// Type path of the include widget, addressed as `[*Include|path=...*]`.
pub(crate) const INCLUDE_TYPE_PATH: &str = "IncludeWidget";

/// Registry with every built-in widget.
///
/// Relative include paths resolve against `base_dir`.
pub(crate) fn builtin_registry(base_dir: &Path) -> WidgetRegistry {
    let base_dir = base_dir.to_path_buf();
    WidgetRegistry::new().with_widget(INCLUDE_TYPE_PATH, move || {
        IncludeWidget::new(base_dir.clone())
    })
}

/// Inlines the contents of a file.
///
/// Attributes:
/// - `path` (required): file to read, relative to the base directory; it must
///   stay inside that directory
/// - `trim` (optional, default `true`): strip surrounding whitespace
struct IncludeWidget {
    base_dir: PathBuf,
    path: Option<PathBuf>,
    trim: bool,
}

impl IncludeWidget {
    fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            path: None,
            trim: true,
        }
    }
}

impl Widget for IncludeWidget {
    fn configure(&mut self, attrs: &AttributeSet) -> Result<(), WidgetError> {
        attrs.ensure_known(&["path", "trim"])?;
        self.path = Some(resolve_within(&self.base_dir, attrs.require("path")?)?);
        if let Some(trim) = attrs.get_parsed::<bool>("trim")? {
            self.trim = trim;
        }
        Ok(())
    }

    fn run(&mut self) -> Result<String, WidgetError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| WidgetError::MissingAttribute("path".to_owned()))?;
        let content = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "Included file");
        if self.trim {
            Ok(content.trim().to_owned())
        } else {
            Ok(content)
        }
    }
}

/// Canonical path of `relative` under `base_dir`.
///
/// Fails when the file does not exist or when it resolves outside `base_dir`
/// (`..` segments, absolute paths, symlinks).
fn resolve_within(base_dir: &Path, relative: &str) -> Result<PathBuf, WidgetError> {
    let canonical = base_dir.join(relative).canonicalize()?;
    let canonical_base = base_dir.canonicalize()?;

    if canonical.starts_with(&canonical_base) {
        Ok(canonical)
    } else {
        Err(WidgetError::InvalidAttribute {
            name: "path".to_owned(),
            value: relative.to_owned(),
            reason: "path escapes the include directory".to_owned(),
        })
    }
}
