//! Structured logging field names for docvault.
//!
//! All crates use these constants for structured `tracing` fields so log
//! aggregation can query the same names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Failed background job, failed compensation, operator attention needed |
//! | WARN  | Recoverable issue (best-effort cleanup failed, index/store divergence) |
//! | INFO  | Lifecycle events: document ingested, deleted, job completed |
//! | DEBUG | Decision points and intermediate values |
//! | TRACE | Per-item iteration (search hits, multipart parts) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "service", "db", "storage", "search", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "ingest", "search", "lifecycle", "dispatcher", "s3", "elasticsearch"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "upload", "search", "delete", "convert", "extract"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Tenant (company) UUID scoping the operation.
pub const TENANT_ID: &str = "tenant_id";

/// Background job kind ("preview", "text_index").
pub const JOB_TYPE: &str = "job_type";

/// Object store key.
pub const OBJECT_KEY: &str = "object_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or listing.
pub const RESULT_COUNT: &str = "result_count";

/// Byte length of an uploaded or derived blob.
pub const BYTE_COUNT: &str = "byte_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
