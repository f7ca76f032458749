//! Styled stderr output for the CLI.

use console::{Style, Term};

/// Writes CLI messages to stderr so stdout stays reserved for decoded text.
pub(crate) struct Output {
    term: Term,
    heading: Style,
    resolved: Style,
    warning: Style,
    error: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            heading: Style::new().cyan().bold(),
            resolved: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
        }
    }

    /// Plain line.
    pub(crate) fn line(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// Section heading.
    pub(crate) fn heading(&self, msg: &str) {
        self.styled(&self.heading, msg);
    }

    /// One allow-list entry and the handler path it maps to. Entries without
    /// a registered handler are flagged in the warning style.
    pub(crate) fn widget(&self, alias: &str, type_path: &str, resolved: bool) {
        if resolved {
            self.styled(&self.resolved, &format!("  {alias} -> {type_path}"));
        } else {
            self.styled(&self.warning, &format!("  {alias} -> {type_path} (no handler)"));
        }
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.styled(&self.warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.styled(&self.error, msg);
    }

    fn styled(&self, style: &Style, msg: &str) {
        let _ = self.term.write_line(&style.apply_to(msg).to_string());
    }
}
