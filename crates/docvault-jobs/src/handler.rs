//! Job handlers for each job type.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use docvault_core::defaults;

/// Kinds of background work derived from an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    /// Render a PDF preview through the conversion service.
    Preview,
    /// Extract text and upsert it into the search index.
    TextIndex,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Preview => "preview",
            JobType::TextIndex => "text_index",
        }
    }

    /// Default deadline, measured from when the job starts executing.
    pub fn default_deadline(&self) -> Duration {
        match self {
            JobType::Preview => Duration::from_secs(defaults::PREVIEW_DEADLINE_SECS),
            JobType::TextIndex => Duration::from_secs(defaults::EXTRACTION_DEADLINE_SECS),
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scheduled unit of work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub job_type: JobType,
    pub document_id: Uuid,
}

impl Job {
    pub fn new(job_type: JobType, document_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            job_type,
            document_id,
        }
    }
}

/// Context provided to job handlers.
pub struct JobContext {
    pub job: Job,
}

impl JobContext {
    pub fn new(job: Job) -> Self {
        Self { job }
    }

    pub fn document_id(&self) -> Uuid {
        self.job.document_id
    }
}

/// Result of job execution. There is no retry: failures are terminal.
#[derive(Debug)]
pub enum JobResult {
    /// Job completed successfully with optional result data.
    Success(Option<JsonValue>),
    /// Job failed with an error message.
    Failed(String),
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        matches!(self, JobResult::Success(_))
    }
}

impl<T: Into<JsonValue>> From<docvault_core::Result<T>> for JobResult {
    fn from(result: docvault_core::Result<T>) -> Self {
        match result {
            Ok(value) => JobResult::Success(Some(value.into())),
            Err(e) => JobResult::Failed(e.to_string()),
        }
    }
}

#[async_trait]
pub trait JobHandler: Send + Sync {
    /// The job type this handler processes.
    fn job_type(&self) -> JobType;

    async fn execute(&self, ctx: JobContext) -> JobResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvault_core::Error;

    #[test]
    fn test_job_type_names() {
        assert_eq!(JobType::Preview.to_string(), "preview");
        assert_eq!(JobType::TextIndex.as_str(), "text_index");
        assert_eq!(
            serde_json::to_value(JobType::TextIndex).unwrap(),
            serde_json::json!("text_index")
        );
    }

    #[test]
    fn test_default_deadlines() {
        assert_eq!(JobType::Preview.default_deadline(), Duration::from_secs(300));
        assert_eq!(JobType::TextIndex.default_deadline(), Duration::from_secs(600));
    }

    #[test]
    fn test_job_result_from_result() {
        let ok: JobResult = docvault_core::Result::Ok("done").into();
        assert!(ok.is_success());

        let err: JobResult =
            docvault_core::Result::<String>::Err(Error::Validation("bad".into())).into();
        match err {
            JobResult::Failed(msg) => assert_eq!(msg, "Validation error: bad"),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_context_document_id() {
        let doc = Uuid::new_v4();
        let ctx = JobContext::new(Job::new(JobType::Preview, doc));
        assert_eq!(ctx.document_id(), doc);
    }
}
