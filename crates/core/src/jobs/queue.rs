use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Work handed to the downstream processor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmission {
    pub job_id: Uuid,
    /// Environment-style parameters, e.g. `JOB_ID`, `OUTPUT_CODEC`.
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("job queue rejected the submission: {0}")]
    Rejected(String),
    #[error("job queue unavailable: {0}")]
    Unavailable(String),
    #[error("unexpected job queue response: {0}")]
    InvalidResponse(String),
}

/// Downstream batch-processing boundary.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Enqueues the submission and returns the queue's own job id.
    async fn enqueue(&self, submission: &JobSubmission) -> Result<String, QueueError>;
}

/// Records submissions in memory. Can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobQueue {
    submissions: Arc<Mutex<Vec<JobSubmission>>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// A queue whose every enqueue fails with `Unavailable(message)`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            submissions: Arc::default(),
            failure: Arc::new(Mutex::new(Some(message.into()))),
        }
    }

    pub async fn set_failure(&self, message: Option<String>) {
        *self.failure.lock().await = message;
    }

    pub async fn submissions(&self) -> Vec<JobSubmission> {
        self.submissions.lock().await.clone()
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn enqueue(&self, submission: &JobSubmission) -> Result<String, QueueError> {
        if let Some(message) = self.failure.lock().await.clone() {
            return Err(QueueError::Unavailable(message));
        }

        self.submissions.lock().await.push(submission.clone());
        Ok(Uuid::new_v4().to_string())
    }
}
