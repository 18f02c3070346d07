//! # docvault-search
//!
//! Full-text index adapters for docvault.
//!
//! This crate provides:
//! - The Elasticsearch wire format for the typed [`docvault_core::BoolQuery`]
//! - An HTTP adapter that upserts, queries and deletes document projections
//!   and provisions the index with a language-aware analyzer
//! - An in-memory index with the same contract for tests
//!
//! ## Example
//!
//! ```ignore
//! use docvault_core::{BoolQuery, SearchIndex};
//! use docvault_search::{ElasticsearchConfig, ElasticsearchIndex};
//!
//! let index = ElasticsearchIndex::new(ElasticsearchConfig::new("http://localhost:9200"))?;
//! index.ensure_index().await?;
//! let hits = index.query(&BoolQuery::documents(tenant_id, None, "invoice")).await?;
//! ```

pub mod elasticsearch;
pub mod memory;
pub mod query;

pub use elasticsearch::{ElasticsearchConfig, ElasticsearchIndex};
pub use memory::MemorySearchIndex;
