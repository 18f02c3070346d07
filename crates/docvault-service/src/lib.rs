//! # docvault-service
//!
//! Document ingestion and retrieval for docvault.
//!
//! This crate provides:
//! - Upload validation and content-addressed, single-pass streaming upload
//!   with compensation on metadata failure
//! - Scheduling of preview and text-index jobs after ingestion
//! - The search aggregator combining the full-text index with the metadata
//!   store under folder and tag filters
//! - Get, update, delete and reindex of existing documents
//! - Tag associations with tenant checks
//! - Environment configuration for the `docvault` binary
//!
//! ## Example
//!
//! ```ignore
//! use docvault_service::DocumentService;
//!
//! let service = DocumentService::builder(docs, folders, tags, objects)
//!     .with_search_index(index)
//!     .with_converter(gotenberg)
//!     .with_extractor(docd)
//!     .build();
//!
//! let doc = service.upload(request, file).await?;
//! let results = service.search(&SearchRequest::browse(tenant_id)).await?;
//! ```

pub mod config;
pub mod lifecycle;
pub mod search;
pub mod service;
pub mod tags;
pub mod upload;

pub use config::Config;
pub use service::{DocumentService, DocumentServiceBuilder};
