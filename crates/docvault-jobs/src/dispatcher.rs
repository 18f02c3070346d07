//! Detached, deadline-bound background job execution.
//!
//! Jobs are submitted once and run on their own tokio task, independent of
//! the request that scheduled them. A semaphore bounds how many execute at
//! once; each job's deadline starts when it acquires a permit. Nothing is
//! persisted, so pending jobs are lost if the process exits.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{broadcast, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use docvault_core::env::{self, Lookup};
use docvault_core::{defaults, Error, Result};

use crate::handler::{Job, JobContext, JobHandler, JobResult, JobType};

/// Configuration for the job dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum number of jobs executing at once.
    pub max_concurrent_jobs: usize,
    /// Deadline for preview jobs.
    pub preview_deadline: Duration,
    /// Deadline for text-index jobs.
    pub extraction_deadline: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: defaults::JOB_MAX_CONCURRENT,
            preview_deadline: JobType::Preview.default_deadline(),
            extraction_deadline: JobType::TextIndex.default_deadline(),
        }
    }
}

impl DispatcherConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `JOB_MAX_CONCURRENT` | `8` | Max concurrently executing jobs |
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let max = env::parse_or(
            lookup,
            defaults::ENV_JOB_MAX_CONCURRENT,
            defaults::JOB_MAX_CONCURRENT,
        )?;
        Ok(Self::default().with_max_concurrent(max))
    }

    pub fn with_max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = max.max(1);
        self
    }

    pub fn with_deadline(mut self, job_type: JobType, deadline: Duration) -> Self {
        match job_type {
            JobType::Preview => self.preview_deadline = deadline,
            JobType::TextIndex => self.extraction_deadline = deadline,
        }
        self
    }

    pub fn deadline(&self, job_type: JobType) -> Duration {
        match job_type {
            JobType::Preview => self.preview_deadline,
            JobType::TextIndex => self.extraction_deadline,
        }
    }
}

/// Event emitted by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Started {
        job_id: Uuid,
        job_type: JobType,
        document_id: Uuid,
    },
    Completed {
        job_id: Uuid,
        job_type: JobType,
        document_id: Uuid,
    },
    Failed {
        job_id: Uuid,
        job_type: JobType,
        document_id: Uuid,
        error: String,
    },
    TimedOut {
        job_id: Uuid,
        job_type: JobType,
        document_id: Uuid,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            JobEvent::Started { job_id, .. }
            | JobEvent::Completed { job_id, .. }
            | JobEvent::Failed { job_id, .. }
            | JobEvent::TimedOut { job_id, .. } => *job_id,
        }
    }

    /// True for events that end a job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEvent::Started { .. })
    }
}

struct Inner {
    config: DispatcherConfig,
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
    permits: Arc<Semaphore>,
    event_tx: broadcast::Sender<JobEvent>,
    tracker: TaskTracker,
}

/// Runs registered handlers as detached tasks. Cheap to clone.
#[derive(Clone)]
pub struct JobDispatcher {
    inner: Arc<Inner>,
}

impl JobDispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn has_handler(&self, job_type: JobType) -> bool {
        self.inner.handlers.contains_key(&job_type)
    }

    /// Get a receiver for job events.
    pub fn events(&self) -> broadcast::Receiver<JobEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Number of submitted jobs that have not finished.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Schedule a job without waiting for it.
    ///
    /// Must be called from within a tokio runtime. Fails only when no
    /// handler is registered for `job_type`.
    pub fn submit(&self, job_type: JobType, document_id: Uuid) -> Result<Uuid> {
        let handler = self
            .inner
            .handlers
            .get(&job_type)
            .cloned()
            .ok_or_else(|| Error::Internal(format!("no handler for job type {}", job_type)))?;

        let job = Job::new(job_type, document_id);
        let job_id = job.id;
        let inner = self.inner.clone();

        debug!(
            subsystem = "jobs",
            component = "dispatcher",
            op = "submit",
            job_id = %job_id,
            job_type = %job_type,
            document_id = %document_id,
            "Job scheduled"
        );

        self.inner
            .tracker
            .spawn(async move { run_job(inner, handler, job).await });
        Ok(job_id)
    }

    /// Wait until every submitted job has finished, then keep accepting work.
    pub async fn wait_idle(&self) {
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        self.inner.tracker.reopen();
    }

    /// Stop tracking new work and wait for in-flight jobs.
    pub async fn shutdown(&self) {
        info!(
            subsystem = "jobs",
            component = "dispatcher",
            op = "shutdown",
            in_flight = self.in_flight(),
            "Waiting for background jobs"
        );
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
    }
}

async fn run_job(inner: Arc<Inner>, handler: Arc<dyn JobHandler>, job: Job) {
    let Job {
        id: job_id,
        job_type,
        document_id,
    } = job.clone();

    let _permit = match inner.permits.clone().acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            error!(job_id = %job_id, "Job semaphore closed");
            return;
        }
    };

    let start = Instant::now();
    let deadline = inner.config.deadline(job_type);
    info!(
        subsystem = "jobs",
        component = "dispatcher",
        op = "execute",
        job_id = %job_id,
        job_type = %job_type,
        document_id = %document_id,
        "Processing job"
    );
    let _ = inner.event_tx.send(JobEvent::Started {
        job_id,
        job_type,
        document_id,
    });

    let outcome = tokio::time::timeout(deadline, handler.execute(JobContext::new(job))).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let event = match outcome {
        Ok(JobResult::Success(_)) => {
            info!(
                job_id = %job_id,
                job_type = %job_type,
                document_id = %document_id,
                duration_ms,
                "Job completed successfully"
            );
            JobEvent::Completed {
                job_id,
                job_type,
                document_id,
            }
        }
        Ok(JobResult::Failed(error)) => {
            error!(
                job_id = %job_id,
                job_type = %job_type,
                document_id = %document_id,
                duration_ms,
                error = %error,
                "Job failed"
            );
            JobEvent::Failed {
                job_id,
                job_type,
                document_id,
                error,
            }
        }
        Err(_) => {
            warn!(
                job_id = %job_id,
                job_type = %job_type,
                document_id = %document_id,
                deadline_secs = deadline.as_secs(),
                "Job exceeded deadline"
            );
            JobEvent::TimedOut {
                job_id,
                job_type,
                document_id,
            }
        }
    };
    let _ = inner.event_tx.send(event);
}

/// Builder for a dispatcher with its handlers.
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    handlers: Vec<Arc<dyn JobHandler>>,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: DispatcherConfig::default(),
            handlers: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_handler<H: JobHandler + 'static>(mut self, handler: H) -> Self {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn build(self) -> JobDispatcher {
        let (event_tx, _) = broadcast::channel(defaults::JOB_EVENT_CAPACITY);
        let handlers: HashMap<JobType, Arc<dyn JobHandler>> = self
            .handlers
            .into_iter()
            .map(|h| (h.job_type(), h))
            .collect();

        debug!(
            subsystem = "jobs",
            component = "dispatcher",
            handler_count = handlers.len(),
            max_concurrent = self.config.max_concurrent_jobs,
            "Job dispatcher built"
        );

        JobDispatcher {
            inner: Arc::new(Inner {
                permits: Arc::new(Semaphore::new(self.config.max_concurrent_jobs)),
                config: self.config,
                handlers,
                event_tx,
                tracker: TaskTracker::new(),
            }),
        }
    }
}
