//! Content scanners invoked per entry by the validator.
//!
//! All scanners are pure predicates over bytes or parsed values; none of them
//! can fail in a way that aborts a validation run.

pub mod code;
pub mod image;
pub mod json;
pub mod text;

pub use code::contains_embedded_code;
pub use image::{looks_polyglot, validate_image, ImageError};
