//! Guarded `PENDING -> PROCESSING` transition for job submission.
//!
//! The status flip is a conditional write, so concurrent submissions of one
//! job produce exactly one enqueue. If enqueueing fails the flip is undone,
//! but only while the job is still `PROCESSING`; a job some other writer has
//! already advanced is left alone.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::{Job, JobPatch, JobRepository, JobStatus, ATTR_STATUS};
use crate::item::AttributeEnum;
use crate::storage::{
    repository_error_code, repository_error_to_status_code, Condition, RepositoryError,
};

use super::{JobQueue, JobSubmission, QueueError};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("job not found: {0}")]
    NotFound(Uuid),
    #[error("job {job_id} is in {status} status; only PENDING jobs can be submitted")]
    InvalidStatus { job_id: Uuid, status: JobStatus },
    #[error("job {0} has already been submitted or its status changed")]
    Conflict(Uuid),
    #[error("failed to enqueue job {job_id}: {source}")]
    Enqueue {
        job_id: Uuid,
        #[source]
        source: QueueError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl SubmitError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidStatus { .. } => 400,
            Self::Conflict(_) => 409,
            Self::Enqueue { .. } => 500,
            Self::Repository(err) => repository_error_to_status_code(err),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "JOB_NOT_FOUND",
            Self::InvalidStatus { .. } => "INVALID_STATUS",
            Self::Conflict(_) => "ALREADY_SUBMITTED",
            Self::Enqueue { .. } => "QUEUE_ERROR",
            Self::Repository(err) => repository_error_code(err),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub job_id: Uuid,
    pub queue_job_id: String,
    pub status: JobStatus,
}

/// Parameters the downstream processor reads.
pub fn submission_for(job: &Job) -> JobSubmission {
    JobSubmission {
        job_id: job.job_id,
        parameters: BTreeMap::from([
            ("JOB_ID".to_string(), job.job_id.to_string()),
            ("OUTPUT_CODEC".to_string(), job.output_codec.as_str().to_string()),
            ("INPUT_FILE".to_string(), job.input_file.clone()),
        ]),
    }
}

fn status_is(status: JobStatus) -> Condition {
    Condition::equals(ATTR_STATUS, status.as_str())
}

pub async fn submit_job(
    jobs: &JobRepository,
    queue: &dyn JobQueue,
    job_id: Uuid,
) -> Result<SubmitOutcome, SubmitError> {
    let job = jobs
        .get_by_id(&job_id)
        .await?
        .ok_or(SubmitError::NotFound(job_id))?;

    if job.status != JobStatus::Pending {
        return Err(SubmitError::InvalidStatus {
            job_id,
            status: job.status,
        });
    }

    match jobs
        .update_where(
            &job_id,
            &JobPatch::status(JobStatus::Processing),
            status_is(JobStatus::Pending),
        )
        .await
    {
        Ok(_) => {}
        Err(RepositoryError::ConditionFailed { .. }) => {
            tracing::info!(%job_id, "Job is no longer PENDING, likely already submitted");
            return Err(SubmitError::Conflict(job_id));
        }
        Err(err) => return Err(err.into()),
    }

    match queue.enqueue(&submission_for(&job)).await {
        Ok(queue_job_id) => {
            tracing::info!(%job_id, %queue_job_id, "Job submitted");
            Ok(SubmitOutcome {
                job_id,
                queue_job_id,
                status: JobStatus::Processing,
            })
        }
        Err(source) => {
            tracing::error!(%job_id, error = %source, "Failed to enqueue job");
            roll_back(jobs, job_id).await;
            Err(SubmitError::Enqueue { job_id, source })
        }
    }
}

async fn roll_back(jobs: &JobRepository, job_id: Uuid) {
    let result = jobs
        .update_where(
            &job_id,
            &JobPatch::status(JobStatus::Pending),
            status_is(JobStatus::Processing),
        )
        .await;

    match result {
        Ok(_) => tracing::info!(%job_id, "Job status rolled back to PENDING"),
        Err(RepositoryError::ConditionFailed { .. }) => {
            tracing::warn!(%job_id, "Job status changed during submission, skipping rollback")
        }
        Err(err) => tracing::error!(%job_id, error = %err, "Failed to roll back job status"),
    }
}
