//! Entry-name helpers. Names are treated as opaque strings and never resolved
//! against the filesystem.

fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(['/', '\\'])
}

/// Why an entry name could escape an extraction directory, if it could.
pub fn unsafe_reason(name: &str) -> Option<&'static str> {
    if name.starts_with('/') || name.starts_with('\\') {
        return Some("absolute path");
    }
    let bytes = name.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Some("absolute path with drive prefix");
    }
    if segments(name).any(|s| s == "..") {
        return Some("parent directory segment");
    }
    if name.contains('\0') {
        return Some("NUL byte in name");
    }
    None
}

/// True for entries that live directly at the archive root.
pub fn is_root_level(name: &str) -> bool {
    !name.contains(['/', '\\'])
}

/// Last path segment of an entry name.
pub fn file_name(name: &str) -> &str {
    segments(name).last().unwrap_or(name)
}

/// True if any directory segment of `name` equals `dir`.
///
/// The final segment only counts for directory entries (`assets/`), so a
/// plain file named `assets` does not satisfy the content-root requirement.
pub fn has_dir_segment(name: &str, dir: &str) -> bool {
    let parts: Vec<&str> = segments(name).collect();
    parts[..parts.len().saturating_sub(1)]
        .iter()
        .any(|s| *s == dir)
}

/// Lowercase extension of the final segment. Dotfiles and trailing dots have none.
pub fn extension(name: &str) -> Option<String> {
    let file = file_name(name);
    match file.rfind('.') {
        None | Some(0) => None,
        Some(i) if i + 1 == file.len() => None,
        Some(i) => Some(file[i + 1..].to_ascii_lowercase()),
    }
}
