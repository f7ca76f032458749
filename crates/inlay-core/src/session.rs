//! Per-decode marker tokenization.
//!
//! A [`DecodeSession`] rewrites the configured delimiters into internal
//! wrappers that embed a random token:
//!
//! ```text
//! [*Name|attrs*]   ->   {<token>:Name|attrs:<token>}
//! ```
//!
//! Because the token is drawn fresh for every decode and never occurs in the
//! input, delimiter look-alikes produced by earlier processing can not be
//! confused with markers once the text is in internal form. Both wrappers
//! carry the token, so only positions that held a delimiter are ever turned
//! back into one; literal braces in the document are left alone.

use rand::RngExt;
use regex::Regex;

use crate::DecodeError;

/// Paragraph tags that upstream rendering wraps around marker-only lines.
const PARAGRAPH_OPEN: &str = "<p>";
const PARAGRAPH_CLOSE: &str = "</p>";

/// State for a single `decode_widgets` call.
pub(crate) struct DecodeSession<'a> {
    start: &'a str,
    end: &'a str,
    /// Internal open wrapper: `{<token>:`.
    open: String,
    /// Internal close wrapper: `:<token>}`.
    close: String,
}

impl<'a> DecodeSession<'a> {
    /// Start a session with a token that occurs neither in `text` nor in the
    /// delimiters.
    pub(crate) fn new(start: &'a str, end: &'a str, text: &str) -> Self {
        let token = loop {
            let candidate = generate_token();
            if !text.contains(&candidate) && !start.contains(&candidate) && !end.contains(&candidate)
            {
                break candidate;
            }
        };

        Self {
            start,
            end,
            open: format!("{{{token}:"),
            close: format!(":{token}}}"),
        }
    }

    /// Rewrite every start delimiter to the open wrapper and every end
    /// delimiter to the close wrapper.
    ///
    /// Single left-to-right pass, start delimiter first at each position.
    pub(crate) fn tokenize(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while !rest.is_empty() {
            if let Some(after) = rest.strip_prefix(self.start) {
                out.push_str(&self.open);
                rest = after;
            } else if let Some(after) = rest.strip_prefix(self.end) {
                out.push_str(&self.close);
                rest = after;
            } else {
                let mut chars = rest.chars();
                if let Some(c) = chars.next() {
                    out.push(c);
                }
                rest = chars.as_str();
            }
        }

        out
    }

    /// Remove `<p>` directly before an open wrapper and `</p>` directly after
    /// a close wrapper.
    pub(crate) fn strip_paragraphs(&self, text: &str) -> String {
        text.replace(&format!("{PARAGRAPH_OPEN}{}", self.open), &self.open)
            .replace(&format!("{}{PARAGRAPH_CLOSE}", self.close), &self.close)
    }

    /// Whether tokenized text contains any internal open wrapper.
    pub(crate) fn has_markers(&self, text: &str) -> bool {
        text.contains(&self.open)
    }

    /// Case-insensitive pattern for markers naming `widget`.
    ///
    /// Group 2 captures the raw attribute string when a `|` follows the name.
    pub(crate) fn marker_pattern(&self, widget: &str) -> Result<Regex, DecodeError> {
        Ok(Regex::new(&format!(
            "(?i){}{}(\\|([^}}]*))?{}",
            regex::escape(&self.open),
            regex::escape(widget),
            regex::escape(&self.close)
        ))?)
    }

    /// Turn wrappers still in internal form back into the delimiters they
    /// were tokenized from.
    ///
    /// Markers for widgets outside the allow-list survive resolution; this
    /// makes them pass through as they were written.
    pub(crate) fn restore(&self, text: &str) -> String {
        text.replace(&self.open, self.start)
            .replace(&self.close, self.end)
    }
}

/// 128 random bits as lowercase hex.
fn generate_token() -> String {
    format!("{:032x}", rand::rng().random::<u128>())
}
