//! Structural and security validation for resource pack archives.
//!
//! A pack is a ZIP archive with a `pack.mcmeta` descriptor and an `assets/`
//! content tree. [`Validator`] runs a fixed battery of checks over the
//! archive's entries and returns a [`ValidationResult`]: either no violations,
//! or an ordered list of them.
//!
//! # Example
//!
//! ```no_run
//! use packcheck_core::{ValidationPolicy, Validator};
//! use std::path::Path;
//!
//! let policy = ValidationPolicy::default().compile().unwrap();
//! let result = Validator::new(policy).validate_path(Path::new("pack.zip"));
//! for line in result.messages() {
//!     println!("{}", line);
//! }
//! ```

pub mod archive;
pub mod diag;
pub mod policy;
pub mod scan;
pub mod validate;
pub mod violation;

// Convenience re-exports
pub use diag::DiagnosticLog;
pub use policy::{
    CompiledPolicy, ImageFormat, PolicyError, PolicyOverrides, ValidationMode, ValidationPolicy,
};
pub use validate::{ValidationResult, Validator};
pub use violation::{Violation, ViolationClass, ViolationKind};
