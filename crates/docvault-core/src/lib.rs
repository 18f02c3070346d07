//! # docvault-core
//!
//! Core types, traits, and policies for docvault.
//!
//! This crate provides the domain model, the error taxonomy, and the
//! capability traits every other docvault crate implements or consumes.

pub mod checksum;
pub mod defaults;
pub mod env;
pub mod error;
pub mod keys;
pub mod logging;
pub mod mime;
pub mod models;
pub mod search;
pub mod traits;

// Re-export commonly used types at crate root
pub use checksum::{sha256_hex, ChecksumReader};
pub use error::{Error, Result};
pub use mime::{is_convertible_to_pdf, is_extractable_text, validate_upload};
pub use models::*;
pub use search::{BoolQuery, Clause};
pub use traits::*;
