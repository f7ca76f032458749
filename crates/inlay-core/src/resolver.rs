//! Allow-list driven marker resolution.

use regex::Regex;

use crate::DecodeError;
use crate::gate::InvocationGate;
use crate::registry::type_name;
use crate::session::DecodeSession;

/// Replace every marker naming an allow-listed widget with its fragment.
///
/// Entries are processed in allow-list order. For each entry the text is
/// searched for the first marker with the entry's bare name (last dotted
/// segment, matched case-insensitively); every identical occurrence of that
/// marker is replaced with the fragment, and the search repeats until no
/// marker for the entry remains. Markers that differ only in attributes are
/// therefore resolved separately.
pub(crate) fn resolve_markers(
    session: &DecodeSession<'_>,
    gate: &InvocationGate<'_>,
    widgets: &[String],
    mut text: String,
) -> Result<String, DecodeError> {
    if !session.has_markers(&text) {
        return Ok(text);
    }

    for alias in widgets {
        let pattern = session.marker_pattern(type_name(alias))?;

        while let Some((marker, raw_attrs)) = next_marker(&pattern, &text) {
            tracing::debug!(widget = %alias, attrs = %raw_attrs, "resolving marker");
            let fragment = gate.resolve(alias, &raw_attrs)?;
            text = text.replace(&marker, &fragment);
        }
    }

    Ok(text)
}

/// First marker matching `pattern`, with its raw attribute string.
fn next_marker(pattern: &Regex, text: &str) -> Option<(String, String)> {
    let caps = pattern.captures(text)?;
    let raw_attrs = caps.get(2).map_or("", |m| m.as_str());
    Some((caps[0].to_owned(), raw_attrs.to_owned()))
}
