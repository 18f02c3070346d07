//! # docvault-storage
//!
//! Object store implementations for docvault: an S3/MinIO adapter with
//! streaming multipart upload and presigned URLs, and an in-memory store.

pub mod memory;
pub mod s3;

pub use memory::MemoryObjectStore;
pub use s3::{S3Config, S3ObjectStore};
