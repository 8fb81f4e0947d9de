//! Image header plausibility checks.
//!
//! Magic bytes and a minimal structural check per format. Nothing is decoded.

use crate::policy::ImageFormat;

pub const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";
const PNG_FIRST_CHUNK: &[u8; 4] = b"IHDR";
const JPEG_SOI: &[u8; 3] = b"\xff\xd8\xff";
const JPEG_EOI: &[u8; 2] = b"\xff\xd9";
const BMP_SIGNATURE: &[u8; 2] = b"BM";
const TGA_HEADER_LEN: usize = 18;
/// Color-mapped, truecolor, grayscale, and their RLE variants.
const TGA_IMAGE_TYPES: &[u8] = &[1, 2, 3, 9, 10, 11];
const MIN_IMAGE_BYTES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    #[error("file too small to be an image ({0} bytes)")]
    TooSmall(usize),
    #[error("missing {0} signature")]
    BadSignature(ImageFormat),
    #[error("first PNG chunk is not IHDR")]
    PngFirstChunk,
    #[error("JPEG is missing end-of-image marker")]
    JpegTruncated,
    #[error("BMP header declares {declared} bytes but file has {actual}")]
    BmpSizeMismatch { declared: u32, actual: usize },
    #[error("TGA header shorter than 18 bytes")]
    TgaHeaderTooShort,
    #[error("TGA image type {0} is not valid")]
    TgaImageType(u8),
}

/// Validate the leading bytes of `data` against the expected `format`.
pub fn validate_image(format: ImageFormat, data: &[u8]) -> Result<(), ImageError> {
    if data.len() < MIN_IMAGE_BYTES {
        return Err(ImageError::TooSmall(data.len()));
    }
    match format {
        ImageFormat::Png => {
            if !data.starts_with(PNG_SIGNATURE) {
                return Err(ImageError::BadSignature(format));
            }
            if data.len() >= 12 && data.get(12..16) != Some(PNG_FIRST_CHUNK.as_slice()) {
                return Err(ImageError::PngFirstChunk);
            }
        }
        ImageFormat::Jpeg => {
            if !data.starts_with(JPEG_SOI) {
                return Err(ImageError::BadSignature(format));
            }
            if !data.ends_with(JPEG_EOI) {
                return Err(ImageError::JpegTruncated);
            }
        }
        ImageFormat::Bmp => {
            if !data.starts_with(BMP_SIGNATURE) {
                return Err(ImageError::BadSignature(format));
            }
            // MIN_IMAGE_BYTES guarantees the size field at 2..6 is present.
            let declared = u32::from_le_bytes([data[2], data[3], data[4], data[5]]);
            if declared != 0 {
                let actual = data.len() as u64;
                let diff = (declared as u64).abs_diff(actual);
                if diff * 10 > actual {
                    return Err(ImageError::BmpSizeMismatch {
                        declared,
                        actual: data.len(),
                    });
                }
            }
        }
        ImageFormat::Tga => {
            if data.len() < TGA_HEADER_LEN {
                return Err(ImageError::TgaHeaderTooShort);
            }
            let image_type = data[2];
            if !TGA_IMAGE_TYPES.contains(&image_type) {
                return Err(ImageError::TgaImageType(image_type));
            }
        }
    }
    Ok(())
}

/// Signatures of containers that should never appear inside an image body.
const EMBEDDED_CONTAINERS: &[(&[u8], &str)] = &[
    (b"PK\x03\x04", "ZIP"),
    (b"%PDF-", "PDF"),
    (b"\x7fELF", "ELF"),
    (b"#!/", "shebang"),
    (b"<!DOCTYPE html", "HTML"),
    (b"<html", "HTML"),
];

/// Detect a second container signature after the image's own header.
///
/// Returns the name of the first embedded container found.
pub fn looks_polyglot(data: &[u8]) -> Option<&'static str> {
    let body = data.get(MIN_IMAGE_BYTES..)?;
    EMBEDDED_CONTAINERS
        .iter()
        .find(|(sig, _)| body.windows(sig.len()).any(|w| w == *sig))
        .map(|(_, name)| *name)
}
