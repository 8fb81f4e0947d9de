use serde::Serialize;

/// Violation classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationClass {
    /// The archive or an entry could not be read (missing file, corrupt zip, IO).
    Integrity,
    /// Pack layout contract (root files, extensions, required files, JSON syntax).
    Contract,
    /// Security violation (path traversal, suspicious content, embedded code).
    Security,
    /// Resource limit exceeded (DoS prevention).
    Limits,
}

impl std::fmt::Display for ViolationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Stable violation kinds reported by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViolationKind {
    // Integrity
    NotFound,
    CorruptArchive,
    UnreadableEntry,
    // Contract
    DisallowedRootFile,
    InvalidMetadataJSON,
    DisallowedExtension,
    InvalidJSON,
    InvalidImage,
    MissingMetadata,
    MissingContentRoot,
    // Security
    UnsafePath,
    SuspiciousMetadata,
    SuspiciousContent,
    EmbeddedCode,
    PolyglotFile,
    // Limits
    TooLarge,
    FileTooLarge,
    TooManyEntries,
    DecompressedTooLarge,
}

impl ViolationKind {
    pub fn class(self) -> ViolationClass {
        use ViolationKind::*;
        match self {
            NotFound | CorruptArchive | UnreadableEntry => ViolationClass::Integrity,
            DisallowedRootFile | InvalidMetadataJSON | DisallowedExtension | InvalidJSON
            | InvalidImage | MissingMetadata | MissingContentRoot => ViolationClass::Contract,
            UnsafePath | SuspiciousMetadata | SuspiciousContent | EmbeddedCode | PolyglotFile => {
                ViolationClass::Security
            }
            TooLarge | FileTooLarge | TooManyEntries | DecompressedTooLarge => {
                ViolationClass::Limits
            }
        }
    }
}

impl std::fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One finding against a pack, optionally tied to an archive entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            entry: None,
            message: message.into(),
        }
    }

    pub fn at(kind: ViolationKind, entry: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            entry: Some(entry.into()),
            message: message.into(),
        }
    }

    pub fn class(&self) -> ViolationClass {
        self.kind.class()
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.entry {
            Some(entry) => write!(f, "[{}] {}: {}", self.kind, entry, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}
