//! Rule policy for pack validation.
//!
//! The policy is plain data: root allow-list, extension tables, size ceilings
//! and the suspicious-keyword pattern. It is loaded from YAML (or built from
//! defaults) and compiled once into a [`CompiledPolicy`] the validator reads.

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 100 * 1024 * 1024; // 100 MB compressed
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024; // 10 MB per entry
pub const DEFAULT_MAX_TOTAL_UNCOMPRESSED_BYTES: u64 = 1024 * 1024 * 1024; // 1 GB
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
pub const DEFAULT_MAX_JSON_DEPTH: usize = 50;

/// Word-boundary, case-insensitive match on code-execution and process-control terms.
pub const DEFAULT_SUSPICIOUS_PATTERN: &str = r"(?i)\b(eval|exec|execute|system|spawn|fork|popen|subprocess|child_process|shell_exec|passthru|proc_open|powershell|getruntime|require)\b";

/// Stop at the first violation, or scan everything and report all of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    FailFast,
    #[default]
    Accumulate,
}

/// Raster formats the image validator knows how to check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Tga,
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tga => "TGA",
        };
        f.write_str(name)
    }
}

/// Rule policy enforced by the validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationPolicy {
    /// Metadata descriptor filename (matched at any depth).
    pub metadata_file: String,
    /// Required content subtree segment.
    pub content_root: String,
    /// Files permitted at the archive root.
    pub allowed_root_files: Vec<String>,
    /// Lowercase extensions permitted anywhere in the pack.
    pub allowed_extensions: Vec<String>,
    /// Extensions parsed as JSON and scanned for suspicious strings.
    pub json_extensions: Vec<String>,
    /// Extensions decoded as text and matched against the suspicious pattern.
    pub text_extensions: Vec<String>,
    /// Extension -> image format for header validation and embedded-code scan.
    pub image_formats: BTreeMap<String, ImageFormat>,
    pub max_archive_bytes: u64,
    pub max_file_bytes: u64,
    pub max_total_uncompressed_bytes: u64,
    pub max_entries: usize,
    pub max_json_depth: usize,
    pub suspicious_pattern: String,
    pub mode: ValidationMode,
    /// Flag images carrying a second container signature.
    pub detect_polyglots: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        let image_formats = [
            ("png", ImageFormat::Png),
            ("jpg", ImageFormat::Jpeg),
            ("jpeg", ImageFormat::Jpeg),
            ("bmp", ImageFormat::Bmp),
            ("tga", ImageFormat::Tga),
        ]
        .into_iter()
        .map(|(ext, fmt)| (ext.to_string(), fmt))
        .collect();

        Self {
            metadata_file: "pack.mcmeta".to_string(),
            content_root: "assets".to_string(),
            allowed_root_files: strings(&["pack.mcmeta", "pack.png", "credits.json", "sounds.json"]),
            allowed_extensions: strings(&[
                "png",
                "jpg",
                "jpeg",
                "bmp",
                "tga",
                "json",
                "mcmeta",
                "ogg",
                "txt",
                "lang",
                "properties",
                "fsh",
                "vsh",
                "glsl",
                "jem",
                "jpm",
            ]),
            json_extensions: strings(&["json", "mcmeta", "jem", "jpm"]),
            text_extensions: strings(&["txt", "lang", "properties", "fsh", "vsh", "glsl"]),
            image_formats,
            max_archive_bytes: DEFAULT_MAX_ARCHIVE_BYTES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_total_uncompressed_bytes: DEFAULT_MAX_TOTAL_UNCOMPRESSED_BYTES,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_json_depth: DEFAULT_MAX_JSON_DEPTH,
            suspicious_pattern: DEFAULT_SUSPICIOUS_PATTERN.to_string(),
            mode: ValidationMode::Accumulate,
            detect_polyglots: false,
        }
    }
}

/// Partial overrides for `ValidationPolicy`. Used for CLI flags.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverrides {
    pub max_archive_bytes: Option<u64>,
    pub max_file_bytes: Option<u64>,
    pub max_total_uncompressed_bytes: Option<u64>,
    pub max_entries: Option<usize>,
    pub mode: Option<ValidationMode>,
    pub detect_polyglots: Option<bool>,
}

impl ValidationPolicy {
    /// Load a policy from a YAML (or JSON) file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read policy: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("in policy file {}", path.display()))
    }

    /// Parse a policy from a YAML string. Missing fields take their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse policy YAML")
    }

    /// Apply overrides onto this policy. Only `Some` values override.
    pub fn apply(self, overrides: PolicyOverrides) -> Self {
        Self {
            max_archive_bytes: overrides.max_archive_bytes.unwrap_or(self.max_archive_bytes),
            max_file_bytes: overrides.max_file_bytes.unwrap_or(self.max_file_bytes),
            max_total_uncompressed_bytes: overrides
                .max_total_uncompressed_bytes
                .unwrap_or(self.max_total_uncompressed_bytes),
            max_entries: overrides.max_entries.unwrap_or(self.max_entries),
            mode: overrides.mode.unwrap_or(self.mode),
            detect_polyglots: overrides.detect_polyglots.unwrap_or(self.detect_polyglots),
            ..self
        }
    }

    /// Normalize extension tables and compile the suspicious pattern.
    pub fn compile(self) -> Result<CompiledPolicy, PolicyError> {
        if self.metadata_file.is_empty() || self.metadata_file.contains('/') {
            return Err(PolicyError::InvalidMetadataFile(self.metadata_file));
        }
        if self.content_root.is_empty() || self.content_root.contains('/') {
            return Err(PolicyError::InvalidContentRoot(self.content_root));
        }
        let suspicious =
            Regex::new(&self.suspicious_pattern).map_err(|source| PolicyError::Pattern {
                pattern: self.suspicious_pattern.clone(),
                source,
            })?;

        let lower = |items: &[String]| -> BTreeSet<String> {
            items
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect()
        };

        Ok(CompiledPolicy {
            allowed_root_files: self.allowed_root_files.iter().cloned().collect(),
            allowed_extensions: lower(&self.allowed_extensions),
            json_extensions: lower(&self.json_extensions),
            text_extensions: lower(&self.text_extensions),
            image_formats: self
                .image_formats
                .iter()
                .map(|(ext, fmt)| (ext.trim_start_matches('.').to_ascii_lowercase(), *fmt))
                .collect(),
            suspicious,
            policy: self,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid suspicious_pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("metadata_file must be a bare filename, got '{0}'")]
    InvalidMetadataFile(String),
    #[error("content_root must be a single path segment, got '{0}'")]
    InvalidContentRoot(String),
}

/// A policy ready for use: normalized lookup tables and a compiled pattern.
#[derive(Debug, Clone)]
pub struct CompiledPolicy {
    policy: ValidationPolicy,
    allowed_root_files: BTreeSet<String>,
    allowed_extensions: BTreeSet<String>,
    json_extensions: BTreeSet<String>,
    text_extensions: BTreeSet<String>,
    image_formats: BTreeMap<String, ImageFormat>,
    suspicious: Regex,
}

/// How an entry's content is inspected, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Json,
    Text,
    Image(ImageFormat),
    Opaque,
}

impl CompiledPolicy {
    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }

    pub fn mode(&self) -> ValidationMode {
        self.policy.mode
    }

    pub fn suspicious(&self) -> &Regex {
        &self.suspicious
    }

    pub fn is_allowed_root_file(&self, name: &str) -> bool {
        self.allowed_root_files.contains(name)
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions.contains(ext)
    }

    pub fn content_kind(&self, ext: &str) -> ContentKind {
        if self.json_extensions.contains(ext) {
            ContentKind::Json
        } else if self.text_extensions.contains(ext) {
            ContentKind::Text
        } else if let Some(fmt) = self.image_formats.get(ext) {
            ContentKind::Image(*fmt)
        } else {
            ContentKind::Opaque
        }
    }
}

impl Default for CompiledPolicy {
    fn default() -> Self {
        // The built-in pattern and names are constants known to compile.
        ValidationPolicy::default()
            .compile()
            .expect("default policy compiles")
    }
}
