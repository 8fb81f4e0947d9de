//! Embedded-code scan over raw entry bytes.
//!
//! Byte-based: binary content is scanned as-is, so there is no decoding step
//! that could fail or skip non-UTF-8 data.

use lazy_static::lazy_static;
use regex::bytes::Regex;

lazy_static! {
    /// Markup script tags, server-side script open tags, and code/command execution calls.
    static ref EMBEDDED_CODE: Regex = Regex::new(
        r"(?i-u)<script\b|<\?php|<%@\s*(?:page|include|taglib)\b|<%=[^%]{0,200}%>|javascript:|\b(?:eval|exec|system|shell_exec|passthru|popen|proc_open|base64_decode|assert)\s*\(|child_process|Runtime\.getRuntime|powershell\s+-|cmd\.exe\s+/c"
    )
    .unwrap();
}

/// Returns true if `data` contains any embedded script or code-execution pattern.
pub fn contains_embedded_code(data: &[u8]) -> bool {
    EMBEDDED_CODE.is_match(data)
}
