//! Extracted-text sanitization
//!
//! Every string leaf of an extracted tree goes through [`sanitize_text`] before it
//! is stored or returned, so downstream renderers can embed it in HTML as-is.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Replacement for redacted SQL fragments.
pub const REMOVED_MARKER: &str = "[REMOVED]";

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block pattern is valid")
});

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("markup tag pattern is valid"));

// `;--` precedes `--` so the whole terminator is replaced at once
static SQL_MARKERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)drop\s+table|delete\s+from|insert\s+into|union\s+select|;--|--|/\*|\*/|xp_",
    )
    .expect("SQL marker pattern is valid")
});

/// Sanitize one string: drop script blocks, strip tags, escape HTML, redact SQL markers.
pub fn sanitize_text(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    let without_tags = MARKUP_TAG.replace_all(&without_scripts, "");
    let escaped = escape_html(&without_tags);
    SQL_MARKERS.replace_all(&escaped, REMOVED_MARKER).into_owned()
}

/// Sanitize every string leaf of `tree`. Keys, numbers, booleans, nulls and the
/// order of sequences are left untouched.
pub fn sanitize_tree(tree: Value) -> Value {
    match tree {
        Value::String(s) => Value::String(sanitize_text(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_tree).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, sanitize_tree(value)))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
