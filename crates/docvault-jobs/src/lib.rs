//! # docvault-jobs
//!
//! Background derivation for docvault.
//!
//! This crate provides:
//! - A detached, bounded, deadline-enforcing job dispatcher
//! - Progress notifications via a broadcast channel
//! - The preview (PDF conversion) and text-index (extraction) handlers
//! - HTTP clients for Gotenberg and docd
//!
//! ## Example
//!
//! ```ignore
//! use docvault_jobs::{JobDispatcher, JobType, PreviewHandler, TextIndexHandler};
//!
//! let dispatcher = JobDispatcher::builder()
//!     .with_handler(PreviewHandler::new(docs.clone(), objects.clone(), converter))
//!     .with_handler(TextIndexHandler::new(docs, objects, extractor, index))
//!     .build();
//!
//! dispatcher.submit(JobType::TextIndex, document_id)?;
//! dispatcher.wait_idle().await;
//! ```

pub mod adapters;
pub mod dispatcher;
pub mod handler;
pub mod preview;
pub mod text_index;

pub use adapters::{DocdClient, GotenbergClient};
pub use dispatcher::{DispatcherBuilder, DispatcherConfig, JobDispatcher, JobEvent};
pub use handler::{Job, JobContext, JobHandler, JobResult, JobType};
pub use preview::PreviewHandler;
pub use text_index::TextIndexHandler;
