//! Canonical `name=value` rendering and named-variable extraction.
//!
//! The rendered form uses the same grammar the template parser accepts, so
//! an expected template and an actual decode dump diff line for line and a
//! dump can be parsed back into a template.

use crate::message::Message;
use crate::template::array_base;
use std::fmt;

/// Line terminator of the canonical rendering.
pub const LINE_SEP: &str = "\r\n";

/// Marker returned for a requested name with no matching line.
pub const NOT_FOUND: &str = "NOT_FOUND";

/// One `name=value` line per field, declaration order, `\r\n` terminated.
pub fn render(msg: &Message) -> String {
    let mut out = String::new();
    for (name, value) in msg.values() {
        out.push_str(name);
        out.push('=');
        out.push_str(value);
        out.push_str(LINE_SEP);
    }
    out
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

/// Extract named values from a rendered message.
///
/// `names` is a comma-separated list of field-name prefixes. A line matches
/// a prefix when its field name is the prefix plus an optional digit run
/// (case-insensitive), so `id` collects `id`, `id0`, `id1`, ... Values of
/// all matching lines are joined with a tab; a prefix with no match (or
/// only empty values) yields [`NOT_FOUND`]. Result order follows `names`.
pub fn extract_variables(rendered: &str, names: &str) -> Vec<(String, String)> {
    names
        .split(',')
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .map(|name| {
            let mut parts: Vec<&str> = Vec::new();
            for line in rendered.lines() {
                let Some((field, value)) = line.split_once('=') else {
                    continue;
                };
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if matches_prefix(field.trim(), name) {
                    parts.push(value);
                }
            }
            let joined = if parts.is_empty() {
                NOT_FOUND.to_string()
            } else {
                parts.join("\t")
            };
            (name.to_string(), joined)
        })
        .collect()
}

/// `field` equals `prefix` plus an optional trailing digit run.
fn matches_prefix(field: &str, prefix: &str) -> bool {
    let (base, index) = array_base(field);
    if base.eq_ignore_ascii_case(prefix) {
        return true;
    }
    // `id1` also matches the exact request "id1".
    index.is_some() && field.eq_ignore_ascii_case(prefix)
}
