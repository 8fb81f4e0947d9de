//! Suspicious-string scanner for parsed JSON documents.
//!
//! Strings shaped like identifiers the pack format uses everywhere
//! (`stone`, `minecraft:block/stone`, `block/stone`, `#minecraft:logs`) are
//! never flagged. Any other string leaf is tested against the policy's
//! suspicious-keyword pattern. Object keys are not scanned.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    /// Short bare identifier (length < 30).
    static ref BARE_IDENT: Regex = Regex::new(r"^[A-Za-z0-9_-]{0,29}$").unwrap();
    /// namespace:path
    static ref NAMESPACED: Regex = Regex::new(r"^[a-z0-9_.-]+:[a-z0-9_./-]+$").unwrap();
    /// dir/file relative path
    static ref RELATIVE_PATH: Regex = Regex::new(r"^[a-z0-9_.-]+(?:/[a-z0-9_.-]+)+$").unwrap();
    /// #tag or #namespace:tag
    static ref TAG: Regex = Regex::new(r"^#[a-z0-9_.-]+(?::[a-z0-9_./-]+)?$").unwrap();
}

/// Returns true if the string matches one of the known-safe identifier shapes.
pub fn is_safe_identifier(s: &str) -> bool {
    BARE_IDENT.is_match(s) || NAMESPACED.is_match(s) || RELATIVE_PATH.is_match(s) || TAG.is_match(s)
}

/// Walk `value` to at most `max_depth` levels; true on the first suspicious string leaf.
///
/// Levels deeper than `max_depth` are not inspected.
pub fn is_suspicious(value: &Value, pattern: &Regex, max_depth: usize) -> bool {
    walk(value, pattern, 0, max_depth)
}

fn walk(value: &Value, pattern: &Regex, depth: usize, max_depth: usize) -> bool {
    if depth > max_depth {
        return false;
    }
    match value {
        Value::String(s) => !is_safe_identifier(s) && pattern.is_match(s),
        Value::Array(items) => items
            .iter()
            .any(|item| walk(item, pattern, depth + 1, max_depth)),
        Value::Object(map) => map
            .values()
            .any(|item| walk(item, pattern, depth + 1, max_depth)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}
