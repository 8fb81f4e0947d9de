#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const PACK_MCMETA: &[u8] = br#"{"pack":{"pack_format":15,"description":"Test pack"}}"#;

/// 1x1 RGBA PNG header: signature, IHDR chunk.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR\x00\x00\x00\x01\x00\x00\x00\x01\x08\x06\x00\x00\x00\x1f\x15\xc4\x89";

/// In-memory pack builder. Entries keep insertion order.
#[derive(Default)]
pub struct PackBuilder {
    entries: Vec<(String, Vec<u8>, CompressionMethod)>,
    renames: Vec<(String, String)>,
}

impl PackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pack that passes the default policy.
    pub fn minimal() -> Self {
        Self::new()
            .file("pack.mcmeta", PACK_MCMETA)
            .file("assets/minecraft/textures/block/stone.png", PNG)
    }

    pub fn file(mut self, name: &str, data: &[u8]) -> Self {
        self.entries
            .push((name.to_string(), data.to_vec(), CompressionMethod::Deflated));
        self
    }

    /// Add an uncompressed entry, so its bytes appear verbatim in the archive.
    pub fn stored_file(mut self, name: &str, data: &[u8]) -> Self {
        self.entries
            .push((name.to_string(), data.to_vec(), CompressionMethod::Stored));
        self
    }

    pub fn dir(mut self, name: &str) -> Self {
        assert!(name.ends_with('/'));
        self.entries
            .push((name.to_string(), Vec::new(), CompressionMethod::Stored));
        self
    }

    /// Add an entry whose stored name is rewritten after writing.
    ///
    /// Writers may normalize hostile names, so `hostile` is patched into the
    /// finished bytes over a same-length placeholder.
    pub fn hostile_file(mut self, hostile: &str, data: &[u8]) -> Self {
        let placeholder: String = hostile
            .chars()
            .enumerate()
            .map(|(i, _)| match i {
                0 => (b'a' + self.renames.len() as u8) as char,
                _ if i % 2 == 0 => 'q',
                _ => 'z',
            })
            .collect();
        self.entries
            .push((placeholder.clone(), data.to_vec(), CompressionMethod::Deflated));
        self.renames.push((placeholder, hostile.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data, method) in &self.entries {
            let opts = SimpleFileOptions::default().compression_method(*method);
            if name.ends_with('/') {
                zip.add_directory(name.as_str(), opts).unwrap();
            } else {
                zip.start_file(name.as_str(), opts).unwrap();
                zip.write_all(data).unwrap();
            }
        }
        let mut bytes = zip.finish().unwrap().into_inner();
        for (from, to) in &self.renames {
            replace_all(&mut bytes, from.as_bytes(), to.as_bytes());
        }
        bytes
    }
}

const LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const CENTRAL_HEADER: &[u8] = b"PK\x01\x02";

/// Name stored in the header at `at`, given the offsets of its length field and its first byte.
fn header_name(bytes: &[u8], at: usize, len_field: usize, name_start: usize) -> Option<&[u8]> {
    let len = u16::from_le_bytes([*bytes.get(at + len_field)?, *bytes.get(at + len_field + 1)?]);
    bytes.get(at + name_start..at + name_start + len as usize)
}

/// Offsets of the local and central directory headers for `name`.
fn header_offsets(bytes: &[u8], name: &str) -> (usize, usize) {
    let (mut local, mut central) = (None, None);
    for (i, window) in bytes.windows(4).enumerate() {
        if window == LOCAL_HEADER && header_name(bytes, i, 26, 30) == Some(name.as_bytes()) {
            local = Some(i);
        } else if window == CENTRAL_HEADER && header_name(bytes, i, 28, 46) == Some(name.as_bytes()) {
            central = Some(i);
        }
    }
    (
        local.expect("local header not found"),
        central.expect("central header not found"),
    )
}

/// Overwrite the compression method recorded for `name`.
pub fn set_compression_method(mut bytes: Vec<u8>, name: &str, method: u16) -> Vec<u8> {
    let (local, central) = header_offsets(&bytes, name);
    bytes[local + 8..local + 10].copy_from_slice(&method.to_le_bytes());
    bytes[central + 10..central + 12].copy_from_slice(&method.to_le_bytes());
    bytes
}

/// Overwrite the declared uncompressed size recorded for `name`.
pub fn set_declared_size(mut bytes: Vec<u8>, name: &str, size: u32) -> Vec<u8> {
    let (local, central) = header_offsets(&bytes, name);
    bytes[local + 22..local + 26].copy_from_slice(&size.to_le_bytes());
    bytes[central + 24..central + 28].copy_from_slice(&size.to_le_bytes());
    bytes
}

/// Replace every occurrence of `from` with the same-length `to`.
pub fn patch_bytes(mut bytes: Vec<u8>, from: &[u8], to: &[u8]) -> Vec<u8> {
    replace_all(&mut bytes, from, to);
    bytes
}

fn replace_all(bytes: &mut [u8], from: &[u8], to: &[u8]) {
    assert_eq!(from.len(), to.len());
    let mut i = 0;
    while i + from.len() <= bytes.len() {
        if &bytes[i..i + from.len()] == from {
            bytes[i..i + from.len()].copy_from_slice(to);
            i += from.len();
        } else {
            i += 1;
        }
    }
}
