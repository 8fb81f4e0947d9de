//! Read-only access to pack archives.
//!
//! A pack is a ZIP container. Listing uses the central directory only, so
//! entry names, sizes and count are known before any content is inflated.

mod limits;

use limits::LimitReader;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::{CompressionMethod, ZipArchive};

/// Central-directory view of one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub index: usize,
    pub name: String,
    /// Declared uncompressed size. Untrusted.
    pub size: u64,
    pub is_dir: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("not a readable zip archive: {0}")]
    Zip(#[from] ZipError),
    #[error("unsupported compression method {method} for entry {name}")]
    UnsupportedCompression { name: String, method: String },
    #[error("entry could not be opened: {0}")]
    Entry(#[source] ZipError),
    #[error("entry content unreadable: {0}")]
    Io(#[from] std::io::Error),
}

/// Methods the enabled `zip` features can inflate.
fn is_supported(method: CompressionMethod) -> bool {
    matches!(method, CompressionMethod::Stored | CompressionMethod::Deflated)
}

/// An opened pack archive with its entry listing.
pub struct PackArchive<R> {
    zip: ZipArchive<R>,
    entries: Vec<EntryInfo>,
}

impl<R: Read + Seek> PackArchive<R> {
    /// Parse the archive structure and list entries in archive order.
    ///
    /// An entry stored with a method this build cannot decode fails the whole
    /// archive, whether or not its content would be read later.
    pub fn open(reader: R) -> Result<Self, ArchiveError> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let file = zip.by_index_raw(index)?;
            if !file.is_dir() && !is_supported(file.compression()) {
                return Err(ArchiveError::UnsupportedCompression {
                    name: file.name().to_string(),
                    method: format!("{:?}", file.compression()),
                });
            }
            entries.push(EntryInfo {
                index,
                name: file.name().to_string(),
                size: file.size(),
                is_dir: file.is_dir(),
            });
        }
        Ok(Self { zip, entries })
    }

    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    /// Sum of declared uncompressed sizes.
    pub fn declared_total_size(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.size))
    }

    /// Inflate one entry, failing once more than `limit` bytes are produced.
    pub fn read_entry(&mut self, index: usize, limit: u64) -> Result<Vec<u8>, ArchiveError> {
        let file = self.zip.by_index(index).map_err(ArchiveError::Entry)?;
        let capacity = file.size().min(limit) as usize;
        let mut buf = Vec::with_capacity(capacity);
        LimitReader::new(file, limit).read_to_end(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        zip.add_directory("assets/", opts).unwrap();
        for (name, data) in files {
            zip.start_file(*name, opts).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn lists_entries_in_order() {
        let bytes = build(&[("pack.mcmeta", b"{}"), ("assets/a.txt", b"hello")]);
        let archive = PackArchive::open(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["assets/", "pack.mcmeta", "assets/a.txt"]);
        assert!(archive.entries()[0].is_dir);
        assert_eq!(archive.entries()[2].size, 5);
        assert_eq!(archive.declared_total_size(), 7);
    }

    #[test]
    fn read_entry_respects_limit() {
        let bytes = build(&[("assets/a.txt", b"0123456789")]);
        let mut archive = PackArchive::open(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.read_entry(1, 10).unwrap(), b"0123456789");
        assert!(matches!(
            archive.read_entry(1, 4),
            Err(ArchiveError::Io(_))
        ));
    }

    #[test]
    fn unsupported_method_fails_open() {
        let mut bytes = build(&[("assets/a.ogg", b"OggS")]);
        // Method field: offset 8 in the local header, 10 in the central header.
        for (sig, offset) in [(b"PK\x03\x04", 8), (b"PK\x01\x02", 10)] {
            let starts: Vec<usize> = bytes
                .windows(4)
                .enumerate()
                .filter(|(_, w)| *w == sig)
                .map(|(i, _)| i)
                .collect();
            // The directory entry comes first; patch the file entry.
            let at = starts[1] + offset;
            bytes[at..at + 2].copy_from_slice(&97u16.to_le_bytes());
        }
        let err = PackArchive::open(Cursor::new(bytes)).err().unwrap();
        assert!(matches!(err, ArchiveError::UnsupportedCompression { ref name, .. } if name == "assets/a.ogg"));
    }

    #[test]
    fn garbage_is_rejected() {
        let result = PackArchive::open(Cursor::new(b"definitely not a zip".to_vec()));
        assert!(matches!(result, Err(ArchiveError::Zip(_))));
    }
}
