//! Human-readable report. Entry names come from the archive, so everything
//! printed from the result is sanitized for the terminal first.

use packcheck_core::ValidationResult;
use std::fmt::Write;

const MAX_LINE_CHARS: usize = 300;

pub(crate) fn text(result: &ValidationResult) -> String {
    let mut out = String::new();
    writeln!(out, "packcheck {}: resource pack validation", env!("CARGO_PKG_VERSION")).ok();
    writeln!(out, "archive: {}", sanitize(&result.archive)).ok();
    writeln!(out).ok();

    if result.is_valid() {
        writeln!(
            out,
            "OK: pack is valid ({} entries checked)",
            result.entries_scanned
        )
        .ok();
        return out;
    }

    for line in result.messages() {
        writeln!(out, "  - {}", sanitize(&line)).ok();
    }
    writeln!(out).ok();
    writeln!(out, "FAIL: {} violation(s)", result.violations.len()).ok();
    out
}

/// Replace control characters (ESC, BEL, CR, ...) and cap length.
fn sanitize(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
        .collect();

    if cleaned.chars().count() > MAX_LINE_CHARS {
        let truncated: String = cleaned.chars().take(MAX_LINE_CHARS - 3).collect();
        format!("{}...", truncated)
    } else {
        cleaned
    }
}
