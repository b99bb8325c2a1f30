use std::sync::LazyLock;

use regex::Regex;

/// Matches a numbered-list marker: digits followed by a dot and whitespace.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s").expect("this must never fail"));

/// Breaks a description into lines at numbered-list markers.
///
/// Inserts a line break before every `<digits>.<space>` marker that is not
/// already at the start of a line, then trims leading and trailing
/// whitespace. Pure display helper; storage keeps the raw text.
#[must_use]
pub fn format_description(description: &str) -> String {
    let mut out = String::with_capacity(description.len() + 8);
    let mut last = 0;

    for found in MARKER.find_iter(description) {
        out.push_str(&description[last..found.start()]);
        if found.start() > 0 && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(found.as_str());
        last = found.end();
    }
    out.push_str(&description[last..]);

    out.trim().to_string()
}
