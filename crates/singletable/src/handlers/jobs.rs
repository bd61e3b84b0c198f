use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use uuid::Uuid;

use singletable_core::entities::{Job, JobMapper, NewJob};
use singletable_core::jobs::{self, SubmitOutcome};
use singletable_core::storage::{EntityMapper, RepositoryError, Timestamped};

use crate::handlers::error::AppError;
use crate::handlers::extract;
use crate::state::AppState;

/// Create a job (POST /api/jobs).
#[axum::debug_handler]
pub async fn create_job(
    State(state): State<AppState>,
    extract::Json(request): extract::Json<NewJob>,
) -> Result<(StatusCode, Json<Timestamped<Job>>), AppError> {
    let job = Job::pending(request, Uuid::new_v4(), Utc::now().timestamp())?;
    let job = state.jobs.create(job).await?;

    tracing::info!(job_id = %job.job_id, file_name = %job.file_name, "Created job");

    Ok((StatusCode::CREATED, Json(job)))
}

/// Get a job by ID (GET /api/jobs/{job_id}).
#[axum::debug_handler]
pub async fn get_job(
    State(state): State<AppState>,
    extract::Path(job_id): extract::Path<Uuid>,
) -> Result<Json<Timestamped<Job>>, AppError> {
    let job = state
        .jobs
        .get_by_id(&job_id)
        .await?
        .ok_or_else(|| RepositoryError::NotFound {
            entity_type: JobMapper::ENTITY_TYPE,
            id: job_id.to_string(),
        })?;

    Ok(Json(job))
}

/// Hand a PENDING job to the processor (POST /api/jobs/{job_id}/submit).
#[axum::debug_handler]
pub async fn submit_job(
    State(state): State<AppState>,
    extract::Path(job_id): extract::Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitOutcome>), AppError> {
    let outcome = jobs::submit_job(&state.jobs, state.queue.as_ref(), job_id).await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}
