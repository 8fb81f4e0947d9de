use regex::Regex;

/// Test a whole text blob (shader source, lang file, ...) against the pattern.
pub fn is_suspicious(text: &str, pattern: &Regex) -> bool {
    pattern.is_match(text)
}
