//! The pack validation pipeline.
//!
//! # Checks Performed
//!
//! 1. **Existence & size gate**: source exists and is within `max_archive_bytes`
//! 2. **Structure**: the source parses as a ZIP; entry count and declared
//!    uncompressed total are within limits
//! 3. **Per entry**, in archive order:
//!    - path safety (no `..` segment, no absolute name)
//!    - root allow-list for files at the archive root
//!    - metadata descriptor and content-root detection
//!    - extension allow-list and per-file size ceiling
//!    - content scan by extension (JSON, text, image)
//! 4. **Completion**: metadata descriptor and content root were seen
//!
//! Archive-level gates (1, 2) always stop the run. Everything else stops the
//! run only in [`ValidationMode::FailFast`].

mod path;
mod report;

pub use path::{extension, has_dir_segment, is_root_level, unsafe_reason};

use crate::archive::{EntryInfo, PackArchive};
use crate::diag::DiagnosticLog;
use crate::policy::{CompiledPolicy, ContentKind, ImageFormat, ValidationMode};
use crate::scan;
use crate::violation::{Violation, ViolationKind};
use report::{Halt, Report};
use serde::Serialize;
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Outcome of one validation run. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Display name of the validated source.
    pub archive: String,
    pub mode: ValidationMode,
    pub entries_scanned: usize,
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable violation lines, in detection order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.to_string()).collect()
    }

    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    pub fn count(&self, kind: ViolationKind) -> usize {
        self.violations.iter().filter(|v| v.kind == kind).count()
    }
}

#[derive(Debug, Default)]
struct ScanState {
    has_metadata: bool,
    has_content_root: bool,
}

/// What to do with an entry's bytes once the name-level checks pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inspection {
    Metadata,
    Content(ContentKind),
}

/// Stateless validator: every call is a pure function of the archive bytes and the policy.
#[derive(Debug)]
pub struct Validator {
    policy: CompiledPolicy,
    log: DiagnosticLog,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(CompiledPolicy::default())
    }
}

impl Validator {
    pub fn new(policy: CompiledPolicy) -> Self {
        Self {
            policy,
            log: DiagnosticLog::disabled(),
        }
    }

    /// Attach an append-only diagnostic trace.
    pub fn with_log(mut self, log: DiagnosticLog) -> Self {
        self.log = log;
        self
    }

    pub fn policy(&self) -> &CompiledPolicy {
        &self.policy
    }

    /// Validate the archive at `path`.
    pub fn validate_path(&self, path: &Path) -> ValidationResult {
        let archive = path.display().to_string();
        self.log.trace(format!("BEGIN {}", archive));
        let mut report = Report::new(self.policy.mode(), &self.log);
        // Halt only stops the scan; the collected violations are the result.
        let _ = self.run_path(path, &mut report);
        self.finish(archive, report)
    }

    /// Validate an already-open source of `len` bytes.
    pub fn validate_reader<R: Read + Seek>(&self, reader: R, len: u64) -> ValidationResult {
        let archive = "<stream>".to_string();
        self.log.trace(format!("BEGIN {} ({} bytes)", archive, len));
        let mut report = Report::new(self.policy.mode(), &self.log);
        let _ = self
            .size_gate(len, &mut report)
            .and_then(|()| self.scan_archive(reader, &mut report));
        self.finish(archive, report)
    }

    /// Validate an in-memory archive.
    pub fn validate_bytes(&self, bytes: &[u8]) -> ValidationResult {
        self.validate_reader(Cursor::new(bytes), bytes.len() as u64)
    }

    fn finish(&self, archive: String, report: Report<'_>) -> ValidationResult {
        let result = ValidationResult {
            archive,
            mode: self.policy.mode(),
            entries_scanned: report.entries_scanned,
            violations: report.violations,
        };
        tracing::info!(
            archive = %result.archive,
            entries = result.entries_scanned,
            violations = result.violations.len(),
            "validation finished"
        );
        self.log.trace(format!(
            "END {} entries={} violations={}",
            result.archive,
            result.entries_scanned,
            result.violations.len()
        ));
        result
    }

    fn run_path(&self, path: &Path, report: &mut Report<'_>) -> Result<(), Halt> {
        let meta = match fs::metadata(path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => {
                return report.halt(Violation::new(
                    ViolationKind::NotFound,
                    format!("{} is not a regular file", path.display()),
                ))
            }
            Err(e) => {
                return report.halt(Violation::new(
                    ViolationKind::NotFound,
                    format!("{}: {}", path.display(), e),
                ))
            }
        };
        self.size_gate(meta.len(), report)?;

        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                return report.halt(Violation::new(
                    ViolationKind::CorruptArchive,
                    format!("cannot open {}: {}", path.display(), e),
                ))
            }
        };
        self.scan_archive(BufReader::new(file), report)
    }

    fn size_gate(&self, len: u64, report: &mut Report<'_>) -> Result<(), Halt> {
        let max = self.policy.policy().max_archive_bytes;
        self.log
            .trace(format!("CHECK archive size {} <= {}", len, max));
        if len > max {
            return report.halt(Violation::new(
                ViolationKind::TooLarge,
                format!("archive is {} bytes, limit is {}", len, max),
            ));
        }
        Ok(())
    }

    fn scan_archive<R: Read + Seek>(&self, reader: R, report: &mut Report<'_>) -> Result<(), Halt> {
        let mut archive = match PackArchive::open(reader) {
            Ok(archive) => archive,
            Err(e) => return report.halt(Violation::new(ViolationKind::CorruptArchive, e.to_string())),
        };
        let limits = self.policy.policy();

        let count = archive.entries().len();
        self.log.trace(format!("CHECK entry count {} <= {}", count, limits.max_entries));
        if count > limits.max_entries {
            return report.halt(Violation::new(
                ViolationKind::TooManyEntries,
                format!("archive has {} entries, limit is {}", count, limits.max_entries),
            ));
        }
        let total = archive.declared_total_size();
        self.log.trace(format!(
            "CHECK declared uncompressed total {} <= {}",
            total, limits.max_total_uncompressed_bytes
        ));
        if total > limits.max_total_uncompressed_bytes {
            return report.halt(Violation::new(
                ViolationKind::DecompressedTooLarge,
                format!(
                    "entries declare {} uncompressed bytes, limit is {}",
                    total, limits.max_total_uncompressed_bytes
                ),
            ));
        }

        let mut state = ScanState::default();
        let entries = archive.entries().to_vec();
        for entry in &entries {
            report.entries_scanned += 1;
            self.scan_entry(&mut archive, entry, &mut state, report)?;
        }

        if !state.has_metadata {
            report.push(Violation::new(
                ViolationKind::MissingMetadata,
                format!("no {} found", limits.metadata_file),
            ))?;
        }
        if !state.has_content_root {
            report.push(Violation::new(
                ViolationKind::MissingContentRoot,
                format!("no {}/ directory found", limits.content_root),
            ))?;
        }
        Ok(())
    }

    fn scan_entry<R: Read + Seek>(
        &self,
        archive: &mut PackArchive<R>,
        entry: &EntryInfo,
        state: &mut ScanState,
        report: &mut Report<'_>,
    ) -> Result<(), Halt> {
        let name = entry.name.as_str();
        let limits = self.policy.policy();
        self.log.trace(format!(
            "ENTRY {} size={} dir={}",
            name, entry.size, entry.is_dir
        ));

        if let Some(reason) = unsafe_reason(name) {
            // Never look further into an entry that could escape the extraction root.
            return report.push(Violation::at(ViolationKind::UnsafePath, name, reason));
        }

        if !entry.is_dir && is_root_level(name) && !self.policy.is_allowed_root_file(name) {
            report.push(Violation::at(
                ViolationKind::DisallowedRootFile,
                name,
                "file not permitted at archive root",
            ))?;
        }

        let is_metadata = !entry.is_dir && path::file_name(name) == limits.metadata_file;
        if is_metadata {
            state.has_metadata = true;
        }
        if has_dir_segment(name, &limits.content_root) {
            state.has_content_root = true;
        }

        if entry.is_dir {
            return Ok(());
        }

        let ext = extension(name);
        if let Some(ext) = ext.as_deref() {
            if !self.policy.is_allowed_extension(ext) {
                return report.push(Violation::at(
                    ViolationKind::DisallowedExtension,
                    name,
                    format!("extension .{} is not allowed", ext),
                ));
            }
        }

        if entry.size > limits.max_file_bytes {
            return report.push(Violation::at(
                ViolationKind::FileTooLarge,
                name,
                format!(
                    "declared size {} exceeds limit {}",
                    entry.size, limits.max_file_bytes
                ),
            ));
        }

        let inspection = if is_metadata {
            Inspection::Metadata
        } else {
            match ext.as_deref().map(|e| self.policy.content_kind(e)) {
                Some(ContentKind::Opaque) | None => return Ok(()),
                Some(kind) => Inspection::Content(kind),
            }
        };

        let data = match archive.read_entry(entry.index, limits.max_file_bytes) {
            Ok(data) => data,
            Err(e) => {
                return report.push(Violation::at(
                    ViolationKind::UnreadableEntry,
                    name,
                    e.to_string(),
                ))
            }
        };

        match inspection {
            Inspection::Metadata => self.check_json(
                name,
                &data,
                ViolationKind::InvalidMetadataJSON,
                ViolationKind::SuspiciousMetadata,
                report,
            ),
            Inspection::Content(ContentKind::Json) => self.check_json(
                name,
                &data,
                ViolationKind::InvalidJSON,
                ViolationKind::SuspiciousContent,
                report,
            ),
            Inspection::Content(ContentKind::Text) => {
                self.log.trace(format!("CHECK text {}", name));
                let text = String::from_utf8_lossy(&data);
                if scan::text::is_suspicious(&text, self.policy.suspicious()) {
                    report.push(Violation::at(
                        ViolationKind::SuspiciousContent,
                        name,
                        "text matches suspicious keyword pattern",
                    ))?;
                }
                Ok(())
            }
            Inspection::Content(ContentKind::Image(format)) => {
                self.check_image(name, format, &data, report)
            }
            Inspection::Content(ContentKind::Opaque) => Ok(()),
        }
    }

    fn check_json(
        &self,
        name: &str,
        data: &[u8],
        invalid: ViolationKind,
        suspicious: ViolationKind,
        report: &mut Report<'_>,
    ) -> Result<(), Halt> {
        self.log.trace(format!("CHECK json {}", name));
        let body = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                return report.push(Violation::at(invalid, name, format!("invalid JSON: {}", e)))
            }
        };
        let max_depth = self.policy.policy().max_json_depth;
        if scan::json::is_suspicious(&value, self.policy.suspicious(), max_depth) {
            report.push(Violation::at(
                suspicious,
                name,
                "string value matches suspicious keyword pattern",
            ))?;
        }
        Ok(())
    }

    fn check_image(
        &self,
        name: &str,
        format: ImageFormat,
        data: &[u8],
        report: &mut Report<'_>,
    ) -> Result<(), Halt> {
        self.log.trace(format!("CHECK image {} as {}", name, format));
        if let Err(e) = scan::validate_image(format, data) {
            report.push(Violation::at(ViolationKind::InvalidImage, name, e.to_string()))?;
        }
        if scan::contains_embedded_code(data) {
            report.push(Violation::at(
                ViolationKind::EmbeddedCode,
                name,
                "image bytes contain script or code-execution pattern",
            ))?;
        }
        if self.policy.policy().detect_polyglots {
            if let Some(container) = scan::looks_polyglot(data) {
                report.push(Violation::at(
                    ViolationKind::PolyglotFile,
                    name,
                    format!("image also carries a {} signature", container),
                ))?;
            }
        }
        Ok(())
    }
}
